//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed — integrity check or parse failure. Never
    /// includes key material or plaintext.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Invalid key format or size.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The algorithm tag is not in the closed catalogue.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
