// ABOUTME: Delivery session state markers for the type state pattern.
// ABOUTME: Markers carry what each state knows; server-side state is a separate enum.

use serde::Serialize;
use std::fmt;

use crate::oslc::vocab::delivery_state;
use crate::types::TrackerUri;

/// Session created on the server; its state has not been read yet.
/// Available actions: `read()`, `discard()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Created;

/// Session read and waiting to be committed.
/// Available actions: `commit()`, `discard()`
#[derive(Debug, Clone)]
pub struct Ready {
    pub(crate) state: SessionState,
}

/// Commit accepted for asynchronous processing.
/// Available actions: `track()`, `discard()`
#[derive(Debug, Clone)]
pub struct Committing {
    pub(crate) tracker: TrackerUri,
}

/// The server reports the session as delivered.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Delivered;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// States from which an undelivered session may be deleted.
pub trait Discardable: sealed::Sealed {}

impl sealed::Sealed for Created {}
impl sealed::Sealed for Ready {}
impl sealed::Sealed for Committing {}

impl Discardable for Created {}
impl Discardable for Ready {}
impl Discardable for Committing {}

/// `dng_config:deliverySessionState` as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Initialised,
    Scoped,
    Delivered,
    Other(String),
}

impl SessionState {
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            delivery_state::INITIALISED => SessionState::Initialised,
            delivery_state::SCOPED => SessionState::Scoped,
            delivery_state::DELIVERED => SessionState::Delivered,
            other => SessionState::Other(other.to_string()),
        }
    }

    pub fn is_committable(&self) -> bool {
        matches!(self, SessionState::Initialised | SessionState::Scoped)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Initialised => f.write_str("initialised"),
            SessionState::Scoped => f.write_str("scoped"),
            SessionState::Delivered => f.write_str("delivered"),
            SessionState::Other(uri) => f.write_str(uri),
        }
    }
}
