// ABOUTME: Transport error types with SNAFU pattern.
// ABOUTME: Distinguishes connection, protocol, authentication and injected failures.

use snafu::Snafu;

use super::Method;

/// Failure to obtain a response from the server.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransportError {
    #[snafu(display("failed to build HTTP client: {source}"))]
    Client { source: reqwest::Error },

    #[snafu(display("invalid server url '{url}': {message}"))]
    InvalidUrl { url: String, message: String },

    #[snafu(display("{method} {url} failed: {source}"))]
    Send {
        method: Method,
        url: String,
        source: reqwest::Error,
    },

    #[snafu(display("failed to read response body from {url}: {source}"))]
    Body { url: String, source: reqwest::Error },

    #[snafu(display("authentication failed for user '{user}' at {url}"))]
    Authentication { user: String, url: String },

    #[snafu(display("simulated transport failure for {method} {url}"))]
    Simulated { method: Method, url: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The HTTP client could not be configured.
    Setup,
    /// Connecting, sending or reading failed.
    Connection,
    /// The server rejected the credentials.
    Authentication,
    /// A fault injected on purpose.
    Simulated,
}

impl TransportError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Client { .. } | TransportError::InvalidUrl { .. } => {
                TransportErrorKind::Setup
            }
            TransportError::Send { .. } | TransportError::Body { .. } => {
                TransportErrorKind::Connection
            }
            TransportError::Authentication { .. } => TransportErrorKind::Authentication,
            TransportError::Simulated { .. } => TransportErrorKind::Simulated,
        }
    }

    /// Whether trying the same request again could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Send { source, .. } | TransportError::Body { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            _ => false,
        }
    }
}
