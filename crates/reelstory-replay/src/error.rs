//! Replay harness error types.

use reelstory_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the replay harness.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The script is not valid JSON or does not match the script schema.
    #[error("script error: {0}")]
    Script(#[from] serde_json::Error),

    /// The script file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The session rejected the script's stories.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}
