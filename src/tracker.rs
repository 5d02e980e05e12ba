// ABOUTME: Request tracker for asynchronous server operations answered with 202 + Location.
// ABOUTME: Polls with backoff, an overall timeout and cancellation, then applies a verdict policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::oslc::Graph;
use crate::oslc::vocab::{auto, media, prop};
use crate::transport::{Request, Transport, TransportError};
use crate::types::TrackerUri;

/// Progress of a tracked operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackerState {
    InProgress,
    Complete,
}

impl TrackerState {
    fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            auto::IN_PROGRESS => Some(TrackerState::InProgress),
            auto::COMPLETE => Some(TrackerState::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::InProgress => f.write_str("inProgress"),
            TrackerState::Complete => f.write_str("complete"),
        }
    }
}

/// Outcome reported by a completed tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Passed,
    Failed,
    Error,
    Unavailable,
    /// A value outside the OSLC automation vocabulary.
    Unrecognized(String),
}

impl Verdict {
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            auto::PASSED => Verdict::Passed,
            auto::FAILED => Verdict::Failed,
            auto::ERROR => Verdict::Error,
            auto::UNAVAILABLE => Verdict::Unavailable,
            other => Verdict::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => f.write_str("passed"),
            Verdict::Failed => f.write_str("failed"),
            Verdict::Error => f.write_str("error"),
            Verdict::Unavailable => f.write_str("unavailable"),
            Verdict::Unrecognized(other) => write!(f, "unrecognized ({other})"),
        }
    }
}

/// Which verdicts count as success for an operation.
///
/// An unrecognized verdict is rejected under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictPolicy {
    /// Only `passed` succeeds.
    Strict,
    /// `failed` and `error` fail; `passed` and `unavailable` succeed.
    RejectFailures,
    /// Only `error` fails.
    RejectErrors,
}

impl VerdictPolicy {
    pub fn accepts(self, verdict: &Verdict) -> bool {
        match (self, verdict) {
            (_, Verdict::Unrecognized(_)) => false,
            (VerdictPolicy::Strict, v) => *v == Verdict::Passed,
            (VerdictPolicy::RejectFailures, v) => !matches!(v, Verdict::Failed | Verdict::Error),
            (VerdictPolicy::RejectErrors, v) => *v != Verdict::Error,
        }
    }
}

/// Delay, backoff and overall bound for polling a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PollPolicy {
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
    #[serde(default = "default_max_interval", with = "humantime_serde")]
    pub max_interval: Duration,
    /// Multiplier applied to the interval after each read. `1.0` keeps it fixed.
    #[serde(default = "default_backoff")]
    pub backoff: f64,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_max_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff() -> f64 {
    1.5
}

fn default_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            max_interval: default_max_interval(),
            backoff: default_backoff(),
            timeout: default_timeout(),
        }
    }
}

/// Shortest delay accepted between two reads of a tracker.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Largest accepted backoff factor.
pub const MAX_BACKOFF: f64 = 10.0;

impl PollPolicy {
    /// Interval after `current`, grown by the backoff factor and capped at
    /// `max_interval`. A product too large for a `Duration` saturates.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let ceiling = self.max_interval.max(self.interval);
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff.max(1.0))
            .map_or(ceiling, |next| next.min(ceiling))
    }

    /// Reject settings that would poll without pause or overflow the backoff.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval < MIN_POLL_INTERVAL {
            return Err(format!(
                "polling interval must be at least {}ms, got {:?}",
                MIN_POLL_INTERVAL.as_millis(),
                self.interval
            ));
        }
        if !self.backoff.is_finite() || !(1.0..=MAX_BACKOFF).contains(&self.backoff) {
            return Err(format!(
                "polling backoff must be between 1.0 and {MAX_BACKOFF}, got {}",
                self.backoff
            ));
        }
        Ok(())
    }
}

/// Polling settings plus the token that aborts a wait.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    pub poll: PollPolicy,
    pub cancel: CancellationToken,
}

impl WaitOptions {
    pub fn new(poll: PollPolicy, cancel: CancellationToken) -> Self {
        Self { poll, cancel }
    }
}

/// Errors tracking an operation.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected status {status} reading tracker {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("protocol violation from tracker {url}: {message}")]
    Protocol { url: String, message: String },

    #[error("tracker {url} did not complete within {waited:?}")]
    Timeout { url: String, waited: Duration },

    #[error("waiting for tracker {url} was cancelled")]
    Cancelled { url: String },

    #[error("operation tracked by {url} ended with verdict {verdict}: {message}")]
    Rejected {
        url: String,
        verdict: Verdict,
        message: String,
    },
}

/// Accepted outcome of a tracked operation.
#[derive(Debug, Clone)]
pub struct Completion {
    pub verdict: Verdict,
    /// First `uri` reference, e.g. a newly created changeset.
    pub reference: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
struct Snapshot {
    state: TrackerState,
    verdict: Option<Verdict>,
    references: Vec<String>,
    title: Option<String>,
    message: Option<String>,
}

/// Poll cursor over one tracker resource, owned by the operation waiting on it.
pub struct RequestTracker<'a, T: ?Sized> {
    transport: &'a T,
    uri: TrackerUri,
    last: Option<Snapshot>,
    reads: usize,
}

impl<'a, T: Transport + ?Sized> RequestTracker<'a, T> {
    pub fn new(transport: &'a T, uri: TrackerUri) -> Self {
        Self {
            transport,
            uri,
            last: None,
            reads: 0,
        }
    }

    pub fn uri(&self) -> &TrackerUri {
        &self.uri
    }

    /// Number of tracker reads issued so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Read the tracker and return its current state.
    pub async fn state(&mut self) -> Result<TrackerState, TrackerError> {
        let url = self.uri.as_str();
        let request = Request::get(url)
            .accept(media::JSON)
            .content_type(media::JSON);
        let response = self.transport.send(request).await?;
        self.reads += 1;

        if response.status != 200 {
            return Err(TrackerError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let protocol = |message: String| TrackerError::Protocol {
            url: url.to_string(),
            message,
        };
        let graph = Graph::from_rdf_json(&response.body).map_err(|e| protocol(e.to_string()))?;
        let tracker = graph
            .subject_or_only(url)
            .ok_or_else(|| protocol("body does not describe the tracker".to_string()))?;

        let state_uri = tracker
            .first_value(prop::AUTO_STATE)
            .ok_or_else(|| protocol("missing state property".to_string()))?;
        let state = TrackerState::from_uri(state_uri)
            .ok_or_else(|| protocol(format!("unknown state '{state_uri}'")))?;

        let snapshot = Snapshot {
            state,
            verdict: tracker.first_value(prop::AUTO_VERDICT).map(Verdict::from_uri),
            references: tracker
                .uris(prop::DC_REFERENCES)
                .into_iter()
                .map(str::to_string)
                .collect(),
            title: tracker.first_text(prop::DC_TITLE),
            message: tracker.first_value(prop::OSLC_MESSAGE).map(str::to_string),
        };
        tracing::debug!(tracker = %self.uri, %state, "tracker read");
        self.last = Some(snapshot);
        Ok(state)
    }

    /// Verdict of the last read. `None` until a read returned `Complete`.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.last
            .as_ref()
            .filter(|s| s.state == TrackerState::Complete)
            .and_then(|s| s.verdict.as_ref())
    }

    /// First `uri`-typed reference of the last read.
    pub fn reference(&self) -> Option<&str> {
        self.last
            .as_ref()
            .and_then(|s| s.references.first())
            .map(String::as_str)
    }

    /// Diagnostic summary of the last read, for logs only.
    pub fn message(&self) -> String {
        let mut out = format!("Tracker '{}'", self.uri);
        let Some(snapshot) = &self.last else {
            out.push_str(" not read yet");
            return out;
        };
        out.push_str(&format!(" state: {}", snapshot.state));
        if let Some(verdict) = &snapshot.verdict {
            out.push_str(&format!(" verdict: {verdict}"));
        }
        out.push_str(&format!(" references: [{}]", snapshot.references.join(", ")));
        if let Some(title) = &snapshot.title {
            out.push_str(&format!(" {{ {title} }}"));
        }
        if let Some(message) = &snapshot.message {
            out.push_str(&format!(" message: {message}"));
        }
        out
    }

    /// Poll until the tracker reports `Complete` and return its verdict.
    ///
    /// Sleeps between reads, growing the interval by the backoff factor. No
    /// read is issued after `Complete`. Gives up with `Timeout` once the poll
    /// timeout has elapsed, or with `Cancelled` when the token fires.
    pub async fn await_completion(&mut self, wait: &WaitOptions) -> Result<Verdict, TrackerError> {
        let started = Instant::now();
        // `None` when the timeout reaches past what an `Instant` can hold.
        let deadline = started.checked_add(wait.poll.timeout);
        let mut interval = wait.poll.interval;

        loop {
            let read = tokio::select! {
                biased;
                _ = wait.cancel.cancelled() => None,
                state = self.state() => Some(state),
            };
            let Some(state) = read else {
                return Err(self.cancelled());
            };
            let state = state?;

            if state == TrackerState::Complete {
                return self.verdict().cloned().ok_or_else(|| TrackerError::Protocol {
                    url: self.uri.to_string(),
                    message: "complete without a verdict".to_string(),
                });
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                return Err(TrackerError::Timeout {
                    url: self.uri.to_string(),
                    waited: now - started,
                });
            }
            let pause = deadline.map_or(interval, |deadline| interval.min(deadline - now));

            tokio::select! {
                biased;
                _ = wait.cancel.cancelled() => return Err(self.cancelled()),
                _ = tokio::time::sleep(pause) => {}
            }
            interval = wait.poll.next_interval(interval);
        }
    }

    /// Wait for completion and accept the verdict under `policy`.
    pub async fn await_verdict(
        &mut self,
        wait: &WaitOptions,
        policy: VerdictPolicy,
    ) -> Result<Completion, TrackerError> {
        let verdict = self.await_completion(wait).await?;
        let message = self.message();
        if !policy.accepts(&verdict) {
            tracing::error!(tracker = %self.uri, %verdict, "{message}");
            return Err(TrackerError::Rejected {
                url: self.uri.to_string(),
                verdict,
                message,
            });
        }
        Ok(Completion {
            verdict,
            reference: self.reference().map(str::to_string),
            message,
        })
    }

    fn cancelled(&self) -> TrackerError {
        tracing::warn!(tracker = %self.uri, "wait cancelled");
        TrackerError::Cancelled {
            url: self.uri.to_string(),
        }
    }
}

/// Track `uri` to completion with a tracker scoped to this call.
pub async fn track<T: Transport + ?Sized>(
    transport: &T,
    uri: TrackerUri,
    wait: &WaitOptions,
    policy: VerdictPolicy,
) -> Result<Completion, TrackerError> {
    RequestTracker::new(transport, uri)
        .await_verdict(wait, policy)
        .await
}
