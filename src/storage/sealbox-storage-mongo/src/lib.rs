//! # sealbox-storage-mongo
//!
//! The document Storage Backend: `application_keys` and
//! `secret_versions` collections over the `mongodb` driver.
//!
//! MongoDB gives us no cross-document transaction here, so `update`
//! cannot tombstone-then-insert the way the relational backend does in
//! one transaction — a reader could observe a window with zero live
//! documents. Instead this backend inserts the new version first and
//! tombstones the old one second: there is a brief window with *two*
//! live documents, never zero, and [`SecretStore::read`] always prefers
//! the highest version among them, so a concurrent reader always sees
//! at least one version and never an older one once the new version is
//! visible.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{FindOneOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, warn};

use sealbox_crypto::Algorithm;
use sealbox_storage::{AppKeyRecord, AppKeyStore, SecretStore, SecretVersionRecord, StorageError};

/// MongoDB-backed implementation of [`AppKeyStore`] and [`SecretStore`].
#[derive(Clone)]
pub struct MongoBackend {
    app_keys: Collection<AppKeyRecord>,
    secret_versions: Collection<SecretVersionRecord>,
}

impl MongoBackend {
    /// Connects to `uri`, selects database `db_name`, and ensures the
    /// indexes this backend's query patterns depend on.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StorageError> {
        debug!(db_name = %db_name, "connecting to mongodb");

        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        let database = client.database(db_name);
        let backend = Self {
            app_keys: database.collection("application_keys"),
            secret_versions: database.collection("secret_versions"),
        };

        backend.ensure_indexes().await?;
        Ok(backend)
    }

    async fn ensure_indexes(&self) -> Result<(), StorageError> {
        let unique_app_id = IndexModel::builder()
            .keys(doc! { "application_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.app_keys
            .create_index(unique_app_id)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        let secret_identity = IndexModel::builder()
            .keys(doc! { "application_id": 1, "secret_key": 1 })
            .build();

        self.secret_versions
            .create_index(secret_identity)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before UNIX epoch")
            .as_secs() as i64
    }
}

#[async_trait]
impl AppKeyStore for MongoBackend {
    async fn read_app_key(&self, application_id: &str) -> Result<Option<AppKeyRecord>, StorageError> {
        self.app_keys
            .find_one(doc! { "application_id": application_id })
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))
    }

    async fn write_app_key(
        &self,
        application_id: &str,
        algorithm: Algorithm,
        wrapped_app_key: &[u8],
    ) -> Result<(), StorageError> {
        let existing = self.read_app_key(application_id).await?;
        if existing.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "application key for {application_id}"
            )));
        }

        let now = Self::now();
        let record = AppKeyRecord {
            application_id: application_id.to_string(),
            algorithm,
            wrapped_app_key: wrapped_app_key.to_vec(),
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let result = self.app_keys.insert_one(&record).await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StorageError::AlreadyExists(format!(
                "application key for {application_id}"
            ))),
            Err(e) => Err(StorageError::StorageUnavailable(e.to_string())),
        }
    }

    async fn update_app_key(
        &self,
        application_id: &str,
        wrapped_app_key: &[u8],
    ) -> Result<(), StorageError> {
        let now = Self::now();

        let result = self
            .app_keys
            .update_one(
                doc! { "application_id": application_id },
                doc! { "$set": { "wrapped_app_key": wrapped_app_key, "updated_at": now }, "$inc": { "version": 1 } },
            )
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(StorageError::NotFound(format!(
                "application key for {application_id}"
            )));
        }

        Ok(())
    }

    async fn delete_app_key(&self, application_id: &str) -> Result<(), StorageError> {
        self.app_keys
            .delete_one(doc! { "application_id": application_id })
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SecretStore for MongoBackend {
    async fn read(
        &self,
        application_id: &str,
        secret_key: &str,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let options = FindOneOptions::builder()
            .sort(doc! { "version": -1 })
            .build();

        let record = self
            .secret_versions
            .find_one(doc! {
                "application_id": application_id,
                "secret_key": secret_key,
                "is_deleted": false,
            })
            .with_options(options)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(record.map(|r| r.ciphertext))
    }

    async fn write(
        &self,
        application_id: &str,
        secret_key: &str,
        ciphertext: &[u8],
    ) -> Result<(), StorageError> {
        let existing = self
            .secret_versions
            .find_one(doc! {
                "application_id": application_id,
                "secret_key": secret_key,
            })
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if existing.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "secret {application_id}/{secret_key}"
            )));
        }

        let now = Self::now();
        let record = SecretVersionRecord {
            application_id: application_id.to_string(),
            secret_key: secret_key.to_string(),
            ciphertext: ciphertext.to_vec(),
            version: 1,
            is_deleted: false,
            is_destroyed: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let result = self.secret_versions.insert_one(&record).await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StorageError::AlreadyExists(format!(
                "secret {application_id}/{secret_key}"
            ))),
            Err(e) => Err(StorageError::StorageUnavailable(e.to_string())),
        }
    }

    async fn update(
        &self,
        application_id: &str,
        secret_key: &str,
        ciphertext: &[u8],
    ) -> Result<(), StorageError> {
        // A live document isn't required here, only that the logical
        // identity has ever existed — an identity with every prior SVR
        // tombstoned still accepts `update`, resurrecting it at the next
        // version (spec §4.4's recreate-after-delete transition).
        let max_version_options = FindOneOptions::builder()
            .sort(doc! { "version": -1 })
            .build();

        let newest = self
            .secret_versions
            .find_one(doc! {
                "application_id": application_id,
                "secret_key": secret_key,
            })
            .with_options(max_version_options)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        let Some(newest) = newest else {
            return Err(StorageError::NotFound(format!(
                "secret {application_id}/{secret_key}"
            )));
        };

        let now = Self::now();
        let new_record = SecretVersionRecord {
            application_id: application_id.to_string(),
            secret_key: secret_key.to_string(),
            ciphertext: ciphertext.to_vec(),
            version: newest.version + 1,
            is_deleted: false,
            is_destroyed: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        // Insert the new live version before tombstoning the old one —
        // see module docs for why this ordering, not the reverse, is
        // what keeps a concurrent reader from ever seeing zero live
        // versions.
        self.secret_versions
            .insert_one(&new_record)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        // Tombstones whatever was live before the insert above (there may
        // be none, if this `update` is resurrecting an all-tombstoned
        // identity) — excludes the row just inserted via `version`.
        self.secret_versions
            .update_one(
                doc! {
                    "application_id": application_id,
                    "secret_key": secret_key,
                    "is_deleted": false,
                    "version": { "$ne": new_record.version },
                },
                doc! { "$set": { "is_deleted": true, "deleted_at": now, "updated_at": now } },
            )
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, application_id: &str, secret_key: &str) -> Result<(), StorageError> {
        let now = Self::now();

        let result = self
            .secret_versions
            .update_one(
                doc! {
                    "application_id": application_id,
                    "secret_key": secret_key,
                    "is_deleted": false,
                },
                doc! { "$set": { "is_deleted": true, "deleted_at": now, "updated_at": now } },
            )
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if result.matched_count == 0 {
            warn!(application_id = %application_id, secret_key = %secret_key, "delete on already-deleted or unknown secret");
        }

        Ok(())
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        *error.kind,
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
            mongodb::error::WriteError { code: 11000, .. }
        ))
    )
}
