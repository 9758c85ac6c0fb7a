//! # sealbox-manager
//!
//! The Secret Manager: the request pipeline that orchestrates Key
//! Access, the Secret Engine, and a Storage Backend into bootstrap →
//! encrypt/decrypt → persist/retrieve → rollback-on-failure.
//!
//! The original design collapses store and retrieve into one
//! polymorphic `process_request(data: Map | str)` call. This crate
//! splits that into explicit [`SecretManager::store_secrets`] and
//! [`SecretManager::retrieve_secret`] methods and keeps
//! [`SecretManager::process_request`] only as a thin compatibility
//! shim built on top of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::CoreConfig;
pub use error::ManagerError;
pub use types::{RequestData, RetrieveOutcome};

use std::collections::BTreeMap;
use std::sync::Arc;

use sealbox_crypto::Algorithm;
use sealbox_engine::{decrypt_secret, encrypt_secret, Envelope};
use sealbox_storage::{AppKeyStore, SecretStore, StorageError};
use tracing::{debug, warn};

/// Orchestrates the Secret Manager request pipeline. Holds no mutable
/// state beyond `Arc`s to its collaborators — cheap to clone, safe to
/// share across tasks.
#[derive(Clone)]
pub struct SecretManager {
    envelope: Arc<Envelope>,
    app_keys: Arc<dyn AppKeyStore>,
    secrets: Arc<dyn SecretStore>,
}

impl SecretManager {
    /// Builds a manager from process-wide config and a concrete storage
    /// backend. `app_keys` and `secrets` are typically two trait-object
    /// handles onto the same underlying backend instance.
    pub fn new(
        config: CoreConfig,
        app_keys: Arc<dyn AppKeyStore>,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        let envelope = Envelope::new(config.master_algorithm, config.master_key);
        Self {
            envelope: Arc::new(envelope),
            app_keys,
            secrets,
        }
    }

    /// Encrypts and persists every entry in `data` under `application_id`.
    ///
    /// Bootstraps a fresh DEK at `algorithm` (default `aes256-gcm96`) if
    /// the application has never registered one; for an already
    /// registered application, `algorithm` is ignored and the
    /// application's existing algorithm is used. On any per-key failure,
    /// every key written earlier in this call is rolled back (best
    /// effort) before the original error is returned.
    pub async fn store_secrets(
        &self,
        application_id: &str,
        data: &BTreeMap<String, String>,
        algorithm: Option<Algorithm>,
    ) -> Result<(), ManagerError> {
        let (algo, dek) = self.bootstrap_dek(application_id, algorithm).await?;

        let mut written = Vec::with_capacity(data.len());
        for (secret_key, plaintext) in data {
            match self
                .store_one(application_id, secret_key, plaintext, algo, &dek)
                .await
            {
                Ok(()) => written.push(secret_key.clone()),
                Err(e) => {
                    self.rollback(application_id, &written).await;
                    return Err(e);
                },
            }
        }

        Ok(())
    }

    /// Decrypts and returns the current value of `secret_key` under
    /// `application_id`.
    pub async fn retrieve_secret(
        &self,
        application_id: &str,
        secret_key: &str,
    ) -> Result<RetrieveOutcome, ManagerError> {
        let akr = self
            .app_keys
            .read_app_key(application_id)
            .await?
            .ok_or_else(|| ManagerError::NotFound(format!("application {application_id}")))?;

        let dek = self.envelope.unwrap(&akr.wrapped_app_key)?;

        let Some(ciphertext) = self.secrets.read(application_id, secret_key).await? else {
            return Ok(RetrieveOutcome::NotFound);
        };

        let plaintext = decrypt_secret(&self.envelope, akr.algorithm, &dek, &ciphertext).map_err(
            |e| {
                warn!(application_id = %application_id, secret_key = %secret_key, "decrypt failed during retrieve");
                ManagerError::from(e)
            },
        )?;

        let text = String::from_utf8(plaintext.to_vec())
            .map_err(|e| ManagerError::InvalidUtf8(e.to_string()))?;

        Ok(RetrieveOutcome::Found(text))
    }

    /// Deletes the current live version of `secret_key`. The DEK is not
    /// needed for this path. Idempotent: deleting an already-deleted key
    /// succeeds.
    pub async fn delete_secret(&self, application_id: &str, secret_key: &str) -> Result<(), ManagerError> {
        self.secrets.delete(application_id, secret_key).await?;
        Ok(())
    }

    /// Compatibility shim reproducing the original polymorphic
    /// `process_request(data: Map | str) → Map` contract, including the
    /// `{"error": "Secret not found"}` sentinel on a missing retrieve.
    pub async fn process_request(
        &self,
        application_id: &str,
        data: RequestData,
        algorithm: Option<Algorithm>,
    ) -> Result<BTreeMap<String, String>, ManagerError> {
        match data {
            RequestData::Store(map) => {
                self.store_secrets(application_id, &map, algorithm).await?;
                Ok(BTreeMap::from([("status".to_string(), "success".to_string())]))
            },
            RequestData::Retrieve(secret_key) => {
                match self.retrieve_secret(application_id, &secret_key).await? {
                    RetrieveOutcome::Found(value) => Ok(BTreeMap::from([(secret_key, value)])),
                    RetrieveOutcome::NotFound => Ok(BTreeMap::from([(
                        "error".to_string(),
                        "Secret not found".to_string(),
                    )])),
                }
            },
        }
    }

    async fn bootstrap_dek(
        &self,
        application_id: &str,
        algorithm: Option<Algorithm>,
    ) -> Result<(Algorithm, zeroize::Zeroizing<Vec<u8>>), ManagerError> {
        if let Some(akr) = self.app_keys.read_app_key(application_id).await? {
            let dek = self.envelope.unwrap(&akr.wrapped_app_key)?;
            return Ok((akr.algorithm, dek));
        }

        let (algo, dek) = sealbox_keyaccess::generate_app_key(algorithm)?;
        let wrapped = self.envelope.wrap(&dek)?;

        match self.app_keys.write_app_key(application_id, algo, &wrapped).await {
            Ok(()) => Ok((algo, dek)),
            Err(StorageError::AlreadyExists(_)) => {
                debug!(application_id = %application_id, "lost app-key bootstrap race, re-reading");
                let akr = self
                    .app_keys
                    .read_app_key(application_id)
                    .await?
                    .ok_or_else(|| {
                        ManagerError::StorageUnavailable(format!(
                            "app key for {application_id} vanished after AlreadyExists"
                        ))
                    })?;
                let dek = self.envelope.unwrap(&akr.wrapped_app_key)?;
                Ok((akr.algorithm, dek))
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn store_one(
        &self,
        application_id: &str,
        secret_key: &str,
        plaintext: &str,
        algorithm: Algorithm,
        dek: &[u8],
    ) -> Result<(), ManagerError> {
        let ciphertext = encrypt_secret(&self.envelope, algorithm, dek, plaintext.as_bytes())?;

        match self.secrets.write(application_id, secret_key, &ciphertext).await {
            Ok(()) => Ok(()),
            Err(StorageError::AlreadyExists(_)) => {
                self.secrets.update(application_id, secret_key, &ciphertext).await?;
                Ok(())
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn rollback(&self, application_id: &str, secret_keys: &[String]) {
        for secret_key in secret_keys {
            if let Err(e) = self.secrets.delete(application_id, secret_key).await {
                warn!(application_id = %application_id, secret_key = %secret_key, error = %e, "rollback delete failed");
            }
        }
    }
}
