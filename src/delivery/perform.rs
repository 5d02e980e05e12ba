// ABOUTME: End-to-end delivery: create, read, commit, track, and delete on failure.
// ABOUTME: Drives the typestate transitions and never leaves a failed session behind silently.

use tokio::time::Instant;

use super::error::DeliveryError;
use super::session::{DeliveryRequest, DeliverySession};
use super::state::{Discardable, Ready};
use super::transitions::{CommitOutcome, ReadOutcome};
use crate::diagnostics::{Diagnostics, Warning};
use crate::resources::FactoryLookup;
use crate::tracker::{VerdictPolicy, WaitOptions};
use crate::transport::Transport;
use crate::types::DeliverySessionUri;

/// How a successful delivery ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The session was committed and the server reported it delivered.
    Delivered(DeliverySessionUri),
    /// The freshly read session was already delivered; nothing was committed.
    NothingToDeliver(DeliverySessionUri),
}

impl DeliveryOutcome {
    pub fn session(&self) -> &DeliverySessionUri {
        match self {
            DeliveryOutcome::Delivered(uri) | DeliveryOutcome::NothingToDeliver(uri) => uri,
        }
    }
}

/// Delete `session` after `error`, recording a warning if the delete fails too.
async fn abandon<S, T>(
    session: DeliverySession<S>,
    transport: &T,
    diag: &mut Diagnostics,
    error: DeliveryError,
) -> DeliveryError
where
    S: Discardable,
    T: Transport + ?Sized,
{
    let uri = session.uri().to_string();
    tracing::error!(session = %uri, %error, "delivery failed, deleting session");
    if let Err(delete_error) = session.discard(transport).await {
        diag.warn(Warning::session_not_deleted(&uri, delete_error));
    }
    error
}

/// Deliver the types of `request.source` into `request.target`.
///
/// An already delivered session counts as success and is not committed.
/// On every failure after creation the session is deleted before the error
/// is returned.
pub async fn perform_delivery<T, L>(
    transport: &T,
    lookup: &L,
    request: DeliveryRequest,
    wait: &WaitOptions,
    policy: VerdictPolicy,
    diag: &mut Diagnostics,
) -> Result<DeliveryOutcome, DeliveryError>
where
    T: Transport + ?Sized,
    L: FactoryLookup + ?Sized,
{
    let mut session = DeliverySession::create(transport, lookup, request).await?;

    let started = Instant::now();
    let mut interval = wait.poll.interval;
    let ready: DeliverySession<Ready> = loop {
        match session.read(transport).await {
            Ok(ReadOutcome::Ready(ready)) => break ready,
            Ok(ReadOutcome::Delivered(delivered)) => {
                tracing::info!(session = %delivered.uri(), "session already delivered");
                return Ok(DeliveryOutcome::NothingToDeliver(delivered.finish()));
            }
            Ok(ReadOutcome::Unexpected(created, state)) => {
                return Err(abandon(created, transport, diag, DeliveryError::NotCommittable(state)).await);
            }
            Ok(ReadOutcome::Processing(created, location)) => {
                let waited = started.elapsed();
                if waited >= wait.poll.timeout {
                    let error = DeliveryError::StillProcessing { waited };
                    return Err(abandon(created, transport, diag, error).await);
                }
                // Re-read the session itself; the polling location is not followed.
                tracing::debug!(session = %created.uri(), ?location, "session still processing");
                let cancelled = tokio::select! {
                    biased;
                    _ = wait.cancel.cancelled() => true,
                    _ = tokio::time::sleep(interval.min(wait.poll.timeout - waited)) => false,
                };
                if cancelled {
                    return Err(abandon(created, transport, diag, DeliveryError::Cancelled).await);
                }
                interval = wait.poll.next_interval(interval);
                session = created;
            }
            Err((created, error)) => return Err(abandon(created, transport, diag, error).await),
        }
    };

    tracing::info!(session = %ready.uri(), state = %ready.session_state(), "committing delivery");
    let delivered = match ready.commit(transport).await {
        Ok(CommitOutcome::Delivered(delivered)) => delivered,
        Ok(CommitOutcome::Tracking(committing)) => {
            match committing.track(transport, wait, policy).await {
                Ok(delivered) => delivered,
                Err((committing, error)) => {
                    return Err(abandon(committing, transport, diag, error).await);
                }
            }
        }
        Err((ready, error)) => return Err(abandon(ready, transport, diag, error).await),
    };

    let uri = delivered.finish();
    tracing::info!(session = %uri, "delivery complete");
    Ok(DeliveryOutcome::Delivered(uri))
}
