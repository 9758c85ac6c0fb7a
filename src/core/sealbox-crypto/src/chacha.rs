//! Raw ChaCha20 keystream for the `chacha20-poly1305` algorithm tag.
//!
//! This intentionally does **not** apply a Poly1305 tag — the tag name is
//! inherited from the original system's algorithm catalogue, but the
//! wire format it actually produces is an unauthenticated XOR with the
//! ChaCha20 keystream. See the crate's top-level docs and `DESIGN.md` for
//! why this is preserved rather than silently upgraded to an AEAD.
//!
//! Wire format: `nonce (16 bytes) || ciphertext`. The first 4 bytes of the
//! nonce are a little-endian initial block counter, the remaining 12 are
//! the RFC 8439 stream nonce — the same split the reference implementation
//! used.

use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use chacha20::{ChaCha20, Key, Nonce};

use crate::error::CryptoError;
use crate::random::generate_nonce;

/// Size of a ChaCha20 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the counter-prefixed nonce in bytes.
pub const NONCE_SIZE: usize = 16;

const BLOCK_SIZE: u64 = 64;

/// Encrypts `plaintext` by XOR-ing it with the ChaCha20 keystream.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "expected {KEY_SIZE} bytes, got {}",
            key.len()
        )));
    }

    let nonce_bytes = generate_nonce(NONCE_SIZE);
    let mut buffer = plaintext.to_vec();
    apply_keystream(key, &nonce_bytes, &mut buffer)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + buffer.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&buffer);
    Ok(result)
}

/// Decrypts ciphertext produced by [`encrypt`]. ChaCha20 is its own
/// inverse, so this is identical to `encrypt` minus the nonce generation —
/// there is no integrity check to fail, by design of this (unauthenticated)
/// wire format.
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "expected {KEY_SIZE} bytes, got {}",
            key.len()
        )));
    }
    if ciphertext.len() < NONCE_SIZE {
        return Err(CryptoError::InvalidInput(
            "ciphertext shorter than nonce".to_string(),
        ));
    }

    let (nonce_bytes, encrypted) = ciphertext.split_at(NONCE_SIZE);
    let mut buffer = encrypted.to_vec();
    apply_keystream(key, nonce_bytes, &mut buffer)?;
    Ok(buffer)
}

fn apply_keystream(key: &[u8], nonce16: &[u8], buffer: &mut [u8]) -> Result<(), CryptoError> {
    let (counter_bytes, nonce12) = nonce16.split_at(4);
    let counter = u32::from_le_bytes(counter_bytes.try_into().expect("checked length above"));

    let mut cipher = ChaCha20::new(Key::from_slice(key), Nonce::from_slice(nonce12));
    cipher
        .try_seek(u64::from(counter) * BLOCK_SIZE)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    cipher.apply_keystream(buffer);
    Ok(())
}
