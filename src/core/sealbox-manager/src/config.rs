//! Process-wide configuration, built once at startup and passed in
//! explicitly — no environment-variable reads inside the core itself.

use sealbox_crypto::{Algorithm, MasterKey};

use crate::error::ManagerError;

/// The master key and algorithm every `SecretManager` is constructed
/// with. The excluded layers (env/file config parsing) decode
/// `MASTER_KEY` and `MASTER_ALGORITHM` and hand the result here.
pub struct CoreConfig {
    pub(crate) master_algorithm: Algorithm,
    pub(crate) master_key: MasterKey,
}

impl CoreConfig {
    /// Builds a config from an already-parsed algorithm and raw master
    /// key bytes, validating the key's length against the algorithm.
    pub fn from_parts(master_algorithm: Algorithm, master_key_bytes: &[u8]) -> Result<Self, ManagerError> {
        let master_key = MasterKey::from_bytes(master_key_bytes, master_algorithm)
            .map_err(|e| ManagerError::Crypto(e.to_string()))?;

        Ok(Self {
            master_algorithm,
            master_key,
        })
    }

    /// Builds a config from a hex-encoded master key string, as it
    /// would arrive from the `MASTER_KEY` environment variable.
    pub fn from_hex(master_algorithm: Algorithm, master_key_hex: &str) -> Result<Self, ManagerError> {
        let bytes = hex::decode(master_key_hex)
            .map_err(|e| ManagerError::Crypto(format!("MASTER_KEY is not valid hex: {e}")))?;
        Self::from_parts(master_algorithm, &bytes)
    }
}
