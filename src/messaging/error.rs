//! Messaging error types.

use thiserror::Error;

use crate::blob::StorageError;

/// Errors surfaced by channel backends and the engines built on them.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The addressed channel does not exist.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// A concurrent modification or precondition race was detected.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend or decorator does not implement this operation.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// The operation was cancelled cooperatively. Never retried.
    #[error("operation cancelled")]
    Cancelled,

    /// Failure in the offload storage used for externalized content.
    #[error("offload storage error: {0}")]
    Offload(String),

    /// Local I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend fault (network, service, protocol).
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for MessagingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Cancelled => MessagingError::Cancelled,
            StorageError::Unsupported(op) => MessagingError::Unsupported(op),
            StorageError::Io(e) => MessagingError::Io(e),
            other => MessagingError::Offload(other.to_string()),
        }
    }
}

/// Result type for messaging operations.
pub type MessagingResult<T> = std::result::Result<T, MessagingError>;
