//! Cryptographically secure random generation.
//!
//! Uses the operating system's CSPRNG for all random number generation.
//! Sizes are parameterised here rather than fixed because DEK shape varies
//! by algorithm (16 or 32 bytes, or an RSA PEM blob generated elsewhere).

use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

/// Generates `len` cryptographically secure random bytes, wrapped in
/// `Zeroizing` so callers using this for key material get automatic
/// memory cleanup on drop.
pub fn generate_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generates a nonce of the given length. Not wrapped in `Zeroizing`: a
/// nonce is not secret, only unique-per-key.
pub fn generate_nonce(len: usize) -> Vec<u8> {
    let mut nonce = vec![0u8; len];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
