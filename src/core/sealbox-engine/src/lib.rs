//! # sealbox-engine
//!
//! The Secret Engine: algorithm-dispatched encrypt/decrypt over an
//! application's data-encryption key, plus the master-key envelope that
//! wraps both secrets and DEKs before they reach storage.
//!
//! A secret's final ciphertext is the DEK ciphertext wrapped again under
//! the master key: `master_wrap(dek_encrypt(dek, plaintext))`. A DEK's
//! ciphertext at rest is `master_wrap(dek_bytes)` — one layer only.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatch;
pub mod envelope;
pub mod error;

pub use dispatch::{decrypt, encrypt};
pub use envelope::Envelope;
pub use error::EngineError;

use sealbox_crypto::Algorithm;
use zeroize::Zeroizing;

/// Encrypts a secret value: DEK-encrypt then wrap under the master key.
pub fn encrypt_secret(
    envelope: &Envelope,
    algorithm: Algorithm,
    dek: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, EngineError> {
    let inner = dispatch::encrypt(algorithm, dek, plaintext)?;
    envelope.wrap(&inner)
}

/// Decrypts a secret value produced by [`encrypt_secret`].
pub fn decrypt_secret(
    envelope: &Envelope,
    algorithm: Algorithm,
    dek: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, EngineError> {
    let inner = envelope.unwrap(ciphertext)?;
    dispatch::decrypt(algorithm, dek, &inner)
}
