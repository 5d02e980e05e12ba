// ABOUTME: Error types for delivery session operations.
// ABOUTME: Status-specific rejections carry the server's meaning for each code.

use std::time::Duration;

use super::state::SessionState;
use crate::resources::ResourceError;
use crate::tracker::TrackerError;
use crate::transport::TransportError;

/// Errors that can occur while driving a delivery session.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Factory lookup or configuration read failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("delivery session creation rejected with {status}: {reason}")]
    CreateRejected { status: u16, reason: &'static str },

    #[error("reading delivery session failed with {status}: {reason}")]
    ReadFailed { status: u16, reason: &'static str },

    #[error("delivery session commit rejected with {status}: {reason}")]
    CommitRejected { status: u16, reason: &'static str },

    #[error("delivery session not deleted, server answered {status}: {reason}")]
    DeleteRejected { status: u16, reason: &'static str },

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("status {status} from {url} carries no Location header")]
    MissingLocation { url: String, status: u16 },

    #[error("invalid delivery session document from {url}: {message}")]
    Protocol { url: String, message: String },

    #[error("delivery session is in state '{0}' and cannot be committed")]
    NotCommittable(SessionState),

    #[error("delivery session ended in state '{0}' instead of delivered")]
    NotDelivered(SessionState),

    #[error("delivery session still processing after {waited:?}")]
    StillProcessing { waited: Duration },

    #[error("delivery was cancelled")]
    Cancelled,
}

/// Coarse classification used by reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    Connection,
    Rejected,
    Protocol,
    Verdict,
    Interrupted,
}

impl DeliveryError {
    pub fn kind(&self) -> DeliveryErrorKind {
        match self {
            DeliveryError::Transport(_) => DeliveryErrorKind::Connection,
            DeliveryError::Resource(ResourceError::Transport(_)) => DeliveryErrorKind::Connection,
            DeliveryError::Tracker(TrackerError::Transport(_)) => DeliveryErrorKind::Connection,
            DeliveryError::Tracker(TrackerError::Rejected { .. }) => DeliveryErrorKind::Verdict,
            DeliveryError::Tracker(TrackerError::Timeout { .. } | TrackerError::Cancelled { .. })
            | DeliveryError::StillProcessing { .. }
            | DeliveryError::Cancelled => DeliveryErrorKind::Interrupted,
            DeliveryError::CreateRejected { .. }
            | DeliveryError::ReadFailed { .. }
            | DeliveryError::CommitRejected { .. }
            | DeliveryError::DeleteRejected { .. }
            | DeliveryError::NotCommittable(_)
            | DeliveryError::NotDelivered(_) => DeliveryErrorKind::Rejected,
            DeliveryError::Resource(_)
            | DeliveryError::Tracker(_)
            | DeliveryError::UnexpectedStatus { .. }
            | DeliveryError::MissingLocation { .. }
            | DeliveryError::Protocol { .. } => DeliveryErrorKind::Protocol,
        }
    }
}
