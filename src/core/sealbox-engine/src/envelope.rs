//! The process-wide master-key envelope.
//!
//! Every secret is doubly wrapped: the application DEK encrypts the
//! plaintext, and the master key then encrypts that ciphertext again.
//! The DEK itself is wrapped once under the same master key before it is
//! handed to storage. The master algorithm is always symmetric.

use sealbox_crypto::{Algorithm, MasterKey};
use zeroize::Zeroizing;

use crate::dispatch;
use crate::error::EngineError;

/// Wraps and unwraps data under the process-wide master key.
pub struct Envelope {
    algorithm: Algorithm,
    key: MasterKey,
}

impl Envelope {
    /// Builds an envelope from a master key and the symmetric algorithm
    /// it was generated for.
    pub fn new(algorithm: Algorithm, key: MasterKey) -> Self {
        Self { algorithm, key }
    }

    /// Encrypts `plaintext` under the master key.
    pub fn wrap(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        dispatch::encrypt(self.algorithm, self.key.as_bytes(), plaintext)
    }

    /// Decrypts ciphertext produced by [`wrap`](Self::wrap).
    pub fn unwrap(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, EngineError> {
        dispatch::decrypt(self.algorithm, self.key.as_bytes(), ciphertext)
    }
}
