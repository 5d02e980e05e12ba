// ABOUTME: Configuration kind derived from server-assigned URIs.
// ABOUTME: A single pure classification instead of per-kind boolean flags.

use serde::Serialize;
use std::fmt;

/// Kind of a configuration as encoded in its URI by the RM server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationKind {
    Stream,
    Baseline,
    Changeset,
    Unknown,
}

impl ConfigurationKind {
    /// Streams and changesets accept modifications; baselines never do.
    pub fn is_editable(self) -> bool {
        matches!(self, ConfigurationKind::Stream | ConfigurationKind::Changeset)
    }
}

impl fmt::Display for ConfigurationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigurationKind::Stream => "stream",
            ConfigurationKind::Baseline => "baseline",
            ConfigurationKind::Changeset => "changeset",
            ConfigurationKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classify a configuration by substring match on its URI.
///
/// The server's URL scheme is `.../cm/stream/<id>`, `.../cm/baseline/<id>` and
/// `.../cm/changeset/<id>`. Matching is done on the whole URI string and checks
/// `stream`, then `baseline`, then `changeset`, so exactly one kind is returned.
pub fn classify(uri: &str) -> ConfigurationKind {
    if uri.contains("stream") {
        ConfigurationKind::Stream
    } else if uri.contains("baseline") {
        ConfigurationKind::Baseline
    } else if uri.contains("changeset") {
        ConfigurationKind::Changeset
    } else {
        ConfigurationKind::Unknown
    }
}
