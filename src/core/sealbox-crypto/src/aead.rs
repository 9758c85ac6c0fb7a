//! AES-GCM authenticated encryption for the `aes128-gcm96` and
//! `aes256-gcm96` algorithm tags.
//!
//! Both tags share a wire format and differ only in key length, so one
//! pair of functions serves both — the key's length selects AES-128 or
//! AES-256 at call time.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::random::generate_nonce;

/// Size of a GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts plaintext using AES-GCM.
///
/// The nonce is freshly drawn from the CSPRNG and prepended to the
/// ciphertext. Format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
///
/// `key` must be 16 bytes (AES-128) or 32 bytes (AES-256); any other
/// length is rejected.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let nonce_bytes = generate_nonce(NONCE_SIZE);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = match key.len() {
        16 => {
            let cipher = Aes128Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
            cipher
                .encrypt(nonce, plaintext)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
        },
        32 => {
            let cipher = Aes256Gcm::new_from_slice(key)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
            cipher
                .encrypt(nonce, plaintext)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
        },
        other => {
            return Err(CryptoError::InvalidKey(format!(
                "expected 16 or 32 bytes, got {other}"
            )))
        },
    };

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypts ciphertext produced by [`encrypt`].
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if !matches!(key.len(), 16 | 32) {
        return Err(CryptoError::InvalidKey(format!(
            "expected 16 or 32 bytes, got {}",
            key.len()
        )));
    }

    if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidInput(
            "ciphertext too short".to_string(),
        ));
    }

    let nonce = Nonce::from_slice(&ciphertext[..NONCE_SIZE]);
    let encrypted = &ciphertext[NONCE_SIZE..];

    let plaintext = match key.len() {
        16 => {
            let cipher = Aes128Gcm::new_from_slice(key)
                .map_err(|_| CryptoError::DecryptionFailed)?;
            cipher
                .decrypt(nonce, encrypted)
                .map_err(|_| CryptoError::DecryptionFailed)?
        },
        32 => {
            let cipher = Aes256Gcm::new_from_slice(key)
                .map_err(|_| CryptoError::DecryptionFailed)?;
            cipher
                .decrypt(nonce, encrypted)
                .map_err(|_| CryptoError::DecryptionFailed)?
        },
        _ => unreachable!("key length checked above"),
    };

    Ok(Zeroizing::new(plaintext))
}
