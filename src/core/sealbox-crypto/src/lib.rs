//! # sealbox-crypto
//!
//! Core cryptographic primitives for sealbox.
//!
//! This crate provides the low-level operations behind every algorithm in
//! the closed catalogue ([`algorithm::Algorithm`]):
//! - AES-128/256-GCM ([`aead`])
//! - Raw ChaCha20 keystream, no Poly1305 tag ([`chacha`])
//! - RSA-OAEP-SHA256 ([`rsa_engine`])
//! - Secure random generation ([`random`])
//! - The process-wide master key type ([`keys::MasterKey`])
//!
//! ## Security
//!
//! All sensitive key material is zeroized on drop. Key types implement
//! `Debug` with redacted output to prevent accidental logging.
//!
//! ## Example
//!
//! ```
//! use sealbox_crypto::{aead, random};
//!
//! let key = random::generate_bytes(32);
//! let plaintext = b"secret message";
//!
//! let ciphertext = aead::encrypt(&key, plaintext).unwrap();
//! let decrypted = aead::decrypt(&key, &ciphertext).unwrap();
//!
//! assert_eq!(&*decrypted, plaintext);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod algorithm;
pub mod chacha;
pub mod error;
pub mod keys;
pub mod random;
pub mod rsa_engine;

pub use algorithm::Algorithm;
pub use error::CryptoError;
pub use keys::MasterKey;
