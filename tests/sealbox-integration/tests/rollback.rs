//! S5 — a storage failure partway through a batched store rolls back
//! every key written earlier in that same request.
//!
//! Exercising this needs a backend that can be told to fail on demand;
//! `SqlBackend` always succeeds, so this wraps it in a small fault
//! injector that fails `write` for one chosen secret key and delegates
//! everything else straight through.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sealbox_crypto::Algorithm;
use sealbox_manager::{CoreConfig, RetrieveOutcome, SecretManager};
use sealbox_storage::{AppKeyRecord, AppKeyStore, SecretStore, StorageError};
use sealbox_storage_sql::SqlBackend;

struct FailOnceBackend {
    inner: Arc<SqlBackend>,
    fail_secret_key: String,
    tripped: AtomicBool,
}

#[async_trait]
impl AppKeyStore for FailOnceBackend {
    async fn read_app_key(&self, application_id: &str) -> Result<Option<AppKeyRecord>, StorageError> {
        self.inner.read_app_key(application_id).await
    }

    async fn write_app_key(
        &self,
        application_id: &str,
        algorithm: Algorithm,
        wrapped_app_key: &[u8],
    ) -> Result<(), StorageError> {
        self.inner.write_app_key(application_id, algorithm, wrapped_app_key).await
    }

    async fn update_app_key(&self, application_id: &str, wrapped_app_key: &[u8]) -> Result<(), StorageError> {
        self.inner.update_app_key(application_id, wrapped_app_key).await
    }

    async fn delete_app_key(&self, application_id: &str) -> Result<(), StorageError> {
        self.inner.delete_app_key(application_id).await
    }
}

#[async_trait]
impl SecretStore for FailOnceBackend {
    async fn read(&self, application_id: &str, secret_key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.read(application_id, secret_key).await
    }

    async fn write(&self, application_id: &str, secret_key: &str, ciphertext: &[u8]) -> Result<(), StorageError> {
        if secret_key == self.fail_secret_key && !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(StorageError::StorageUnavailable(format!(
                "injected failure for {secret_key}"
            )));
        }
        self.inner.write(application_id, secret_key, ciphertext).await
    }

    async fn update(&self, application_id: &str, secret_key: &str, ciphertext: &[u8]) -> Result<(), StorageError> {
        self.inner.update(application_id, secret_key, ciphertext).await
    }

    async fn delete(&self, application_id: &str, secret_key: &str) -> Result<(), StorageError> {
        self.inner.delete(application_id, secret_key).await
    }
}

#[tokio::test]
async fn mid_batch_failure_rolls_back_every_key_in_the_request() {
    let sql = Arc::new(SqlBackend::in_memory().await.unwrap());
    let backend = Arc::new(FailOnceBackend {
        inner: sql,
        fail_secret_key: "k2".to_string(),
        tripped: AtomicBool::new(false),
    });
    let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x66u8; 32]).unwrap();
    let manager = SecretManager::new(config, backend.clone(), backend.clone());

    let data = BTreeMap::from([
        ("k1".to_string(), "v1".to_string()),
        ("k2".to_string(), "v2".to_string()),
    ]);

    let result = manager.store_secrets("app3", &data, None).await;
    assert!(result.is_err());

    assert_eq!(
        manager.retrieve_secret("app3", "k1").await.unwrap(),
        RetrieveOutcome::NotFound
    );
    assert_eq!(
        manager.retrieve_secret("app3", "k2").await.unwrap(),
        RetrieveOutcome::NotFound
    );
}
