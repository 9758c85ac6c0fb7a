//! Secure key types with automatic memory zeroization.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::Algorithm;
use crate::error::CryptoError;

/// The process-wide master key that wraps every DEK and doubly wraps
/// every secret ciphertext. Loaded once at startup from external
/// configuration; length is validated against the configured master
/// algorithm (always symmetric — RSA is not permitted at this layer).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Builds a master key from raw bytes, validating its length against
    /// the algorithm it will be used with.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if `bytes.len()` doesn't match
    /// `algorithm`'s expected symmetric key length, or
    /// [`CryptoError::UnsupportedAlgorithm`] if `algorithm` is RSA (the
    /// master layer is symmetric-only).
    pub fn from_bytes(bytes: &[u8], algorithm: Algorithm) -> Result<Self, CryptoError> {
        let expected = algorithm.symmetric_key_len().ok_or_else(|| {
            CryptoError::UnsupportedAlgorithm(format!(
                "master algorithm must be symmetric, got {algorithm}"
            ))
        })?;

        if bytes.len() != expected {
            return Err(CryptoError::InvalidKey(format!(
                "master key for {algorithm} must be {expected} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Returns the raw key bytes.
    ///
    /// Use with caution — the returned slice is not zeroized automatically.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
