//! Key Access error types.

use thiserror::Error;

/// Errors that can occur while generating an application data-encryption
/// key.
#[derive(Debug, Error)]
pub enum KeyAccessError {
    /// The requested algorithm tag is not in the closed catalogue.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key generation itself failed (CSPRNG or RSA keygen failure).
    #[error("crypto error: {0}")]
    Crypto(#[from] sealbox_crypto::CryptoError),
}
