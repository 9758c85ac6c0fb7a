//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record exists for the given logical identity.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record already exists where the caller expected none.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The backend (driver, connection pool, schema) is unavailable.
    /// Retriable by the caller.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}
