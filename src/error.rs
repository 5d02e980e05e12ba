// ABOUTME: Application-wide error types for dngcm.
// ABOUTME: Uses thiserror; module errors convert in with #[from].

use std::path::PathBuf;
use thiserror::Error;

use crate::resources::ResourceError;
use crate::transport::TransportError;
use crate::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid worklist {path}: {message}")]
    InvalidWorklist { path: PathBuf, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("ambiguous source: {count} streams are tagged '{tag}'")]
    AmbiguousSource { tag: String, count: usize },

    #[error("no source: no stream is tagged '{0}'")]
    NoSource(String),

    #[error("no stream is tagged '{0}' as a target")]
    NoTargets(String),

    #[error("archive failed: {0}")]
    ArchiveFailed(String),

    #[error("{failed} of {total} item(s) failed")]
    ItemsFailed { failed: usize, total: usize },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
