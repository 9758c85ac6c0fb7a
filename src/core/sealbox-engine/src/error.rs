//! Secret Engine error types.

use thiserror::Error;

/// Errors that can occur while encrypting or decrypting through the
/// Secret Engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The algorithm tag is not in the closed catalogue.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Decryption failed — integrity check or parse failure. Never
    /// includes key material or plaintext in the message.
    #[error("decryption failed")]
    DecryptFailed,

    /// The underlying cryptographic primitive returned an error that
    /// isn't surfaced as `DecryptFailed` (e.g. malformed RSA key, bad
    /// key length).
    #[error("crypto error: {0}")]
    Crypto(#[from] sealbox_crypto::CryptoError),
}
