//! Layered error definitions
//!
//! Categorized by source: config / persistence / replay / filter

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum LaunchError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Persistence Errors =====
    /// Snapshot could not be read or decoded
    #[error("snapshot read error for '{path}': {message}")]
    SnapshotRead { path: String, message: String },

    /// Snapshot could not be written
    #[error("snapshot write error for '{path}': {message}")]
    SnapshotWrite { path: String, message: String },

    // ===== Replay Errors =====
    /// Loaded snapshot has no sample on any channel
    #[error("nothing to replay: snapshot is empty")]
    NothingToReplay,

    // ===== Filter Errors =====
    /// Residual covariance was not invertible.
    ///
    /// Not expected at runtime given fixed positive-definite noise
    /// matrices; a logic error that terminates the episode.
    #[error("singular residual covariance in fusion filter")]
    SingularCovariance,

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl LaunchError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create snapshot read error
    pub fn snapshot_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SnapshotRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create snapshot write error
    pub fn snapshot_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SnapshotWrite {
            path: path.into(),
            message: message.into(),
        }
    }
}
