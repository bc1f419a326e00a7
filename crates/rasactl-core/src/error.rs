//! Error taxonomy shared by the driver and its collaborators.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for rasactl operations.
pub type RasactlResult<T> = Result<T, RasactlError>;

/// Errors surfaced by rasactl operations.
#[derive(Debug, Error)]
pub enum RasactlError {
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid project path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("{program} failed: {message}")]
    Command { program: String, message: String },

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("{url} did not become ready within {}s", timeout.as_secs())]
    ReadinessTimeout { url: String, timeout: Duration },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("probe error: {0}")]
    Probe(String),

    #[error("the {0} namespace exists but is not managed by rasactl")]
    Unmanaged(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("the {namespace} deployment can't move from {from} to {to}")]
    InvalidTransition {
        namespace: String,
        from: String,
        to: String,
    },
}

impl RasactlError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RasactlError::NotFound(_))
    }

    /// Validation failures are never forced through.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RasactlError::InvalidName { .. } | RasactlError::InvalidPath { .. }
        )
    }
}
