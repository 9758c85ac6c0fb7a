//! The closed catalogue of algorithm tags.
//!
//! Every algorithm sealbox speaks is one of these six tags. The tag is the
//! wire-level identifier stored alongside an application key record and is
//! the only vocabulary the rest of the system uses to talk about "which
//! cipher" — there is no open registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// A supported encryption algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-128-GCM, 16-byte key.
    Aes128Gcm96,
    /// AES-256-GCM, 32-byte key.
    Aes256Gcm96,
    /// Raw ChaCha20 keystream, 32-byte key. See crate docs for the
    /// (deliberately unauthenticated) wire format.
    ChaCha20Poly1305,
    /// RSA-OAEP-SHA256 with a 2048-bit key.
    Rsa2048,
    /// RSA-OAEP-SHA256 with a 3072-bit key.
    Rsa3072,
    /// RSA-OAEP-SHA256 with a 4096-bit key.
    Rsa4096,
}

impl Algorithm {
    /// The canonical lowercase, hyphen-joined tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Algorithm::Aes128Gcm96 => "aes128-gcm96",
            Algorithm::Aes256Gcm96 => "aes256-gcm96",
            Algorithm::ChaCha20Poly1305 => "chacha20-poly1305",
            Algorithm::Rsa2048 => "rsa-2048",
            Algorithm::Rsa3072 => "rsa-3072",
            Algorithm::Rsa4096 => "rsa-4096",
        }
    }

    /// The default algorithm used when a caller doesn't request one.
    pub const fn default_tag() -> Self {
        Algorithm::Aes256Gcm96
    }

    /// Whether this algorithm is symmetric (as opposed to RSA).
    pub const fn is_symmetric(self) -> bool {
        matches!(
            self,
            Algorithm::Aes128Gcm96 | Algorithm::Aes256Gcm96 | Algorithm::ChaCha20Poly1305
        )
    }

    /// Key length in bytes for symmetric algorithms, `None` for RSA (whose
    /// "key" is a variable-length PEM blob).
    pub const fn symmetric_key_len(self) -> Option<usize> {
        match self {
            Algorithm::Aes128Gcm96 => Some(16),
            Algorithm::Aes256Gcm96 => Some(32),
            Algorithm::ChaCha20Poly1305 => Some(32),
            Algorithm::Rsa2048 | Algorithm::Rsa3072 | Algorithm::Rsa4096 => None,
        }
    }

    /// RSA modulus size in bits, `None` for symmetric algorithms.
    pub const fn rsa_bits(self) -> Option<usize> {
        match self {
            Algorithm::Rsa2048 => Some(2048),
            Algorithm::Rsa3072 => Some(3072),
            Algorithm::Rsa4096 => Some(4096),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "aes128-gcm96" => Ok(Algorithm::Aes128Gcm96),
            "aes256-gcm96" => Ok(Algorithm::Aes256Gcm96),
            "chacha20-poly1305" => Ok(Algorithm::ChaCha20Poly1305),
            "rsa-2048" => Ok(Algorithm::Rsa2048),
            "rsa-3072" => Ok(Algorithm::Rsa3072),
            "rsa-4096" => Ok(Algorithm::Rsa4096),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl Serialize for Algorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Algorithm::from_str(&tag).map_err(serde::de::Error::custom)
    }
}
