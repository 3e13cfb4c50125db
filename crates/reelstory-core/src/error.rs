//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced story or session does not exist.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// The operation is reserved for the story's author, or forbidden to them.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// The player session has already closed.
    #[error("player session {0} is closed")]
    SessionClosed(Uuid),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// A collaborator (messaging, storage) failed.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
