//! Secret Manager error types.

use thiserror::Error;

/// Errors that can occur during a Secret Manager request. Mirrors the
/// error taxonomy shared across the core: only `AlreadyExists` (app-key
/// bootstrap) and `NotFound` (retrieve path) are recovered internally;
/// everything else propagates to the caller after any rollback runs.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The algorithm tag is not in the closed catalogue.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Decryption failed — integrity check or parse failure.
    #[error("decryption failed")]
    DecryptFailed,

    /// No application key record exists for this application.
    #[error("not found: {0}")]
    NotFound(String),

    /// The storage backend is unavailable. Retriable by the caller.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The request was cancelled mid-batch; any partial writes were
    /// rolled back on a best-effort basis before this was returned.
    #[error("cancelled")]
    Cancelled,

    /// An unexpected low-level cryptographic fault.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// A decrypted secret value was not valid UTF-8.
    #[error("secret value is not valid utf-8: {0}")]
    InvalidUtf8(String),
}

impl From<sealbox_storage::StorageError> for ManagerError {
    fn from(error: sealbox_storage::StorageError) -> Self {
        match error {
            sealbox_storage::StorageError::NotFound(msg) => ManagerError::NotFound(msg),
            sealbox_storage::StorageError::AlreadyExists(msg) => {
                // Not recovered here — callers that expect to recover
                // AlreadyExists (the bootstrap race, the write/update
                // probe) catch it before it reaches this conversion.
                ManagerError::StorageUnavailable(format!("unexpected conflict: {msg}"))
            },
            sealbox_storage::StorageError::StorageUnavailable(msg) => {
                ManagerError::StorageUnavailable(msg)
            },
        }
    }
}

impl From<sealbox_engine::EngineError> for ManagerError {
    fn from(error: sealbox_engine::EngineError) -> Self {
        match error {
            sealbox_engine::EngineError::UnsupportedAlgorithm(tag) => {
                ManagerError::UnsupportedAlgorithm(tag)
            },
            sealbox_engine::EngineError::DecryptFailed => ManagerError::DecryptFailed,
            sealbox_engine::EngineError::Crypto(e) => ManagerError::Crypto(e.to_string()),
        }
    }
}

impl From<sealbox_keyaccess::KeyAccessError> for ManagerError {
    fn from(error: sealbox_keyaccess::KeyAccessError) -> Self {
        match error {
            sealbox_keyaccess::KeyAccessError::UnsupportedAlgorithm(tag) => {
                ManagerError::UnsupportedAlgorithm(tag)
            },
            sealbox_keyaccess::KeyAccessError::Crypto(e) => ManagerError::Crypto(e.to_string()),
        }
    }
}
