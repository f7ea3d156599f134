//! Blob storage error types.

use thiserror::Error;

/// Errors surfaced by blob storage backends and the listing engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The addressed path does not exist.
    ///
    /// The listing engine absorbs this as an empty subtree; all other
    /// operations propagate it.
    #[error("path not found: {0}")]
    NotFound(String),

    /// A concurrent modification or precondition race was detected.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend does not implement this operation.
    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    /// The operation was cancelled cooperatively. Never retried.
    #[error("operation cancelled")]
    Cancelled,

    /// Local I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend fault (network, service, protocol).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for blob storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
