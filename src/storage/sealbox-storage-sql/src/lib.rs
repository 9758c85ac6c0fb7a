//! # sealbox-storage-sql
//!
//! The relational Storage Backend: `application_keys` and
//! `secret_versions` tables over SQLite via `sqlx`. `update` on a secret
//! is a single transaction containing the tombstone-update and the
//! insert, giving readers an atomic view of "old version or new version,
//! never neither, never both as current."

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

use sealbox_crypto::Algorithm;
use sealbox_storage::{AppKeyRecord, AppKeyStore, SecretStore, StorageError};

/// SQLite-backed implementation of [`AppKeyStore`] and [`SecretStore`].
#[derive(Clone)]
pub struct SqlBackend {
    pool: SqlitePool,
}

impl SqlBackend {
    /// Opens or creates a SQLite database file at `path` and runs schema
    /// migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect(&url, 5).await
    }

    /// Opens an in-process SQLite database, for tests. Held to a single
    /// connection: SQLite's `:memory:` database is per-connection, so a
    /// pool of more than one would see independent, empty databases.
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        debug!(url = %url, "opening sqlite pool");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        let backend = Self { pool };
        backend.migrate().await?;
        Ok(backend)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        debug!("running sealbox schema migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS application_keys (
                application_id  TEXT PRIMARY KEY,
                algorithm       TEXT NOT NULL,
                wrapped_app_key BLOB NOT NULL,
                version         INTEGER NOT NULL DEFAULT 1,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(format!("migration failed: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS secret_versions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                application_id  TEXT NOT NULL,
                secret_key      TEXT NOT NULL,
                ciphertext      BLOB NOT NULL,
                version         INTEGER NOT NULL,
                is_deleted      INTEGER NOT NULL DEFAULT 0,
                is_destroyed    INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL,
                deleted_at      INTEGER,
                UNIQUE(application_id, secret_key, version)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(format!("migration failed: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_secret_versions_lookup \
             ON secret_versions (application_id, secret_key, is_deleted, version)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(format!("migration failed: {e}")))?;

        debug!("migrations complete");
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
impl AppKeyStore for SqlBackend {
    async fn read_app_key(&self, application_id: &str) -> Result<Option<AppKeyRecord>, StorageError> {
        let row: Option<(String, String, Vec<u8>, i64, i64, i64)> = sqlx::query_as(
            "SELECT application_id, algorithm, wrapped_app_key, version, created_at, updated_at \
             FROM application_keys WHERE application_id = ?",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        row.map(|(application_id, algorithm, wrapped_app_key, version, created_at, updated_at)| {
            Ok(AppKeyRecord {
                application_id,
                algorithm: Algorithm::from_str(&algorithm)
                    .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?,
                wrapped_app_key,
                version: version as u32,
                created_at,
                updated_at,
            })
        })
        .transpose()
    }

    async fn write_app_key(
        &self,
        application_id: &str,
        algorithm: Algorithm,
        wrapped_app_key: &[u8],
    ) -> Result<(), StorageError> {
        let now = Self::now();

        let result = sqlx::query(
            "INSERT INTO application_keys \
             (application_id, algorithm, wrapped_app_key, version, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(application_id)
        .bind(algorithm.as_str())
        .bind(wrapped_app_key)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                StorageError::AlreadyExists(format!("application key for {application_id}")),
            ),
            Err(e) => Err(StorageError::StorageUnavailable(e.to_string())),
        }
    }

    async fn update_app_key(
        &self,
        application_id: &str,
        wrapped_app_key: &[u8],
    ) -> Result<(), StorageError> {
        let now = Self::now();

        let result = sqlx::query(
            "UPDATE application_keys SET wrapped_app_key = ?, version = version + 1, updated_at = ? \
             WHERE application_id = ?",
        )
        .bind(wrapped_app_key)
        .bind(now)
        .bind(application_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "application key for {application_id}"
            )));
        }

        Ok(())
    }

    async fn delete_app_key(&self, application_id: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM application_keys WHERE application_id = ?")
            .bind(application_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SecretStore for SqlBackend {
    async fn read(
        &self,
        application_id: &str,
        secret_key: &str,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as(
            "SELECT ciphertext FROM secret_versions \
             WHERE application_id = ? AND secret_key = ? AND is_deleted = 0 \
             ORDER BY version DESC LIMIT 1",
        )
        .bind(application_id)
        .bind(secret_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(row.map(|(ciphertext,)| ciphertext))
    }

    async fn write(
        &self,
        application_id: &str,
        secret_key: &str,
        ciphertext: &[u8],
    ) -> Result<(), StorageError> {
        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM secret_versions WHERE application_id = ? AND secret_key = ? LIMIT 1",
        )
        .bind(application_id)
        .bind(secret_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if existing.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "secret {application_id}/{secret_key}"
            )));
        }

        let now = Self::now();

        sqlx::query(
            "INSERT INTO secret_versions \
             (application_id, secret_key, ciphertext, version, is_deleted, is_destroyed, created_at, updated_at) \
             VALUES (?, ?, ?, 1, 0, 0, ?, ?)",
        )
        .bind(application_id)
        .bind(secret_key)
        .bind(ciphertext)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }

    async fn update(
        &self,
        application_id: &str,
        secret_key: &str,
        ciphertext: &[u8],
    ) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        // A live row isn't required here — only that the logical identity
        // has ever existed. A tombstoned-only identity (every prior SVR
        // deleted) still accepts `update`, which resurrects it at the next
        // version; see the recreate-after-delete transition in spec §4.4's
        // state machine.
        let current: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM secret_versions WHERE application_id = ? AND secret_key = ? LIMIT 1",
        )
        .bind(application_id)
        .bind(secret_key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if current.is_none() {
            return Err(StorageError::NotFound(format!(
                "secret {application_id}/{secret_key}"
            )));
        }

        let max_version: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version), 0) FROM secret_versions \
             WHERE application_id = ? AND secret_key = ?",
        )
        .bind(application_id)
        .bind(secret_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        let now = Self::now();

        sqlx::query(
            "UPDATE secret_versions SET is_deleted = 1, deleted_at = ?, updated_at = ? \
             WHERE application_id = ? AND secret_key = ? AND is_deleted = 0",
        )
        .bind(now)
        .bind(now)
        .bind(application_id)
        .bind(secret_key)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        sqlx::query(
            "INSERT INTO secret_versions \
             (application_id, secret_key, ciphertext, version, is_deleted, is_destroyed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, 0, ?, ?)",
        )
        .bind(application_id)
        .bind(secret_key)
        .bind(ciphertext)
        .bind(max_version.0 + 1)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, application_id: &str, secret_key: &str) -> Result<(), StorageError> {
        let now = Self::now();

        let result = sqlx::query(
            "UPDATE secret_versions SET is_deleted = 1, deleted_at = ?, updated_at = ? \
             WHERE application_id = ? AND secret_key = ? AND is_deleted = 0",
        )
        .bind(now)
        .bind(now)
        .bind(application_id)
        .bind(secret_key)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if result.rows_affected() == 0 {
            warn!(application_id = %application_id, secret_key = %secret_key, "delete on already-deleted or unknown secret");
        }

        Ok(())
    }
}
