//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum CliError {
    /// Profile file not found
    #[error("Profile file not found: {path}")]
    ConfigNotFound { path: String },

    /// Profile parsing error
    #[error("Failed to parse profile: {message}")]
    ConfigParse { message: String },

    /// Profile validation error
    #[error("Profile validation failed: {message}")]
    ConfigValidation { message: String },

    /// No episode file available for replay
    #[error("No recorded episode found in {dir}")]
    NoEpisodeFound { dir: String },

    /// Pipeline execution error
    #[error("Pipeline execution failed: {message}")]
    PipelineExecution { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

#[allow(dead_code)]
impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn no_episode_found(dir: impl Into<String>) -> Self {
        Self::NoEpisodeFound { dir: dir.into() }
    }

    pub fn pipeline_execution(message: impl Into<String>) -> Self {
        Self::PipelineExecution {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, CliError>;
