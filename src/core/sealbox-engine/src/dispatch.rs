//! Algorithm-dispatched encrypt/decrypt over the closed catalogue.

use sealbox_crypto::{aead, chacha, rsa_engine, Algorithm};
use zeroize::Zeroizing;

use crate::error::EngineError;

/// Encrypts `plaintext` under `key` using `algorithm`.
///
/// `key` must already be the correctly shaped DEK for `algorithm` — this
/// function does not generate keys, see `sealbox-keyaccess` for that.
pub fn encrypt(algorithm: Algorithm, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
    match algorithm {
        Algorithm::Aes128Gcm96 | Algorithm::Aes256Gcm96 => {
            Ok(aead::encrypt(key, plaintext)?)
        },
        Algorithm::ChaCha20Poly1305 => Ok(chacha::encrypt(key, plaintext)?),
        Algorithm::Rsa2048 | Algorithm::Rsa3072 | Algorithm::Rsa4096 => {
            Ok(rsa_engine::encrypt(key, plaintext)?)
        },
    }
}

/// Decrypts `ciphertext` produced by [`encrypt`] with the same `algorithm`
/// and `key`.
pub fn decrypt(
    algorithm: Algorithm,
    key: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, EngineError> {
    match algorithm {
        Algorithm::Aes128Gcm96 | Algorithm::Aes256Gcm96 => match aead::decrypt(key, ciphertext) {
            Ok(plaintext) => Ok(plaintext),
            Err(sealbox_crypto::CryptoError::DecryptionFailed) => Err(EngineError::DecryptFailed),
            Err(e) => Err(e.into()),
        },
        Algorithm::ChaCha20Poly1305 => {
            // No authentication tag by design — see sealbox-crypto::chacha.
            // Malformed input (too short) still surfaces as a crypto error.
            Ok(Zeroizing::new(chacha::decrypt(key, ciphertext)?))
        },
        Algorithm::Rsa2048 | Algorithm::Rsa3072 | Algorithm::Rsa4096 => {
            match rsa_engine::decrypt(key, ciphertext) {
                Ok(plaintext) => Ok(plaintext),
                Err(sealbox_crypto::CryptoError::DecryptionFailed) => {
                    Err(EngineError::DecryptFailed)
                },
                Err(e) => Err(e.into()),
            }
        },
    }
}
