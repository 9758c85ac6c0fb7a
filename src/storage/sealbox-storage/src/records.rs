//! The two persisted record shapes: Application Key Records and Secret
//! Version Records.

use sealbox_crypto::Algorithm;
use serde::{Deserialize, Serialize};

/// One per application. `algorithm` is immutable for the life of the
/// record — rotation replaces `wrapped_app_key` and bumps `version`,
/// never the algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppKeyRecord {
    /// Opaque application identifier, unique primary key.
    pub application_id: String,
    /// The algorithm this application's DEK was generated with.
    pub algorithm: Algorithm,
    /// The DEK after master-key envelope encryption.
    pub wrapped_app_key: Vec<u8>,
    /// Monotonically increasing, starts at 1, bumped on every rotation.
    pub version: u32,
    /// UTC unix timestamp of creation.
    pub created_at: i64,
    /// UTC unix timestamp of the last update.
    pub updated_at: i64,
}

/// Append-only log entry for one secret's ciphertext history. For any
/// `(application_id, secret_key)`, exactly one SVR has `is_deleted=false`
/// at a time; the rest are retained as tombstones for audit/rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretVersionRecord {
    /// Owning application.
    pub application_id: String,
    /// Logical key within the application's secret namespace.
    pub secret_key: String,
    /// Opaque bytes produced by the double-envelope pipeline.
    pub ciphertext: Vec<u8>,
    /// Starts at 1 for a given logical identity, increases by 1 per
    /// update.
    pub version: u32,
    /// Tombstone flag.
    pub is_deleted: bool,
    /// Reserved for crypto-shredding. Never transitioned by this core.
    pub is_destroyed: bool,
    /// UTC unix timestamp of creation.
    pub created_at: i64,
    /// UTC unix timestamp of the last update.
    pub updated_at: i64,
    /// UTC unix timestamp of the tombstone transition, if any.
    pub deleted_at: Option<i64>,
}

impl AppKeyRecord {
    /// Algorithm and wrapped key as the `(algorithm, wrapped_app_key)`
    /// pair used throughout the Secret Manager pipeline.
    pub fn as_algorithm_and_key(&self) -> (Algorithm, &[u8]) {
        (self.algorithm, &self.wrapped_app_key)
    }
}
