//! Storage Backend trait definitions.
//!
//! Two capability traits, implemented in full by each concrete driver.
//! Neither trait shares a code path inside the core: the relational and
//! document backends each own their complete implementation.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::records::AppKeyRecord;
use sealbox_crypto::Algorithm;

/// Persists and retrieves Application Key Records.
#[async_trait]
pub trait AppKeyStore: Send + Sync {
    /// Returns the current AKR for `application_id`, or `None` if the
    /// application has never registered a key.
    async fn read_app_key(&self, application_id: &str) -> Result<Option<AppKeyRecord>, StorageError>;

    /// Inserts a new AKR at `version = 1`.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::AlreadyExists`] if an AKR already
    /// exists for `application_id`.
    async fn write_app_key(
        &self,
        application_id: &str,
        algorithm: Algorithm,
        wrapped_app_key: &[u8],
    ) -> Result<(), StorageError>;

    /// Replaces `wrapped_app_key` and bumps `version`. The algorithm on
    /// the existing record is never changed.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::NotFound`] if no AKR exists for
    /// `application_id`.
    async fn update_app_key(
        &self,
        application_id: &str,
        wrapped_app_key: &[u8],
    ) -> Result<(), StorageError>;

    /// Hard-deletes the AKR for `application_id`.
    async fn delete_app_key(&self, application_id: &str) -> Result<(), StorageError>;
}

/// Persists and retrieves Secret Version Records.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the ciphertext of the current (`is_deleted=false`) SVR
    /// for `(application_id, secret_key)`, or `None` if no such record
    /// exists.
    async fn read(
        &self,
        application_id: &str,
        secret_key: &str,
    ) -> Result<Option<Vec<u8>>, StorageError>;

    /// Inserts a new SVR at `version = 1`. First-time creation only.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::AlreadyExists`] if any SVR — deleted
    /// or not — already exists for this logical identity.
    async fn write(
        &self,
        application_id: &str,
        secret_key: &str,
        ciphertext: &[u8],
    ) -> Result<(), StorageError>;

    /// Tombstones the current non-deleted SVR and inserts a new one at
    /// `version = prior_max + 1`. Must be atomic with respect to
    /// concurrent readers: a reader observes the old version or the new
    /// version, never neither and never both as current.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::NotFound`] if no prior record exists.
    async fn update(
        &self,
        application_id: &str,
        secret_key: &str,
        ciphertext: &[u8],
    ) -> Result<(), StorageError>;

    /// Tombstones the current non-deleted SVR. Idempotent: deleting an
    /// already-deleted logical identity succeeds without creating a new
    /// tombstone.
    async fn delete(&self, application_id: &str, secret_key: &str) -> Result<(), StorageError>;
}
