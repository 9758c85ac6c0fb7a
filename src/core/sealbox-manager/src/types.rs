//! Public result types for the Secret Manager's explicit API.

/// The result of [`crate::SecretManager::retrieve_secret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieveOutcome {
    /// The secret exists; its plaintext value.
    Found(String),
    /// No live version exists for this `(application_id, secret_key)`.
    NotFound,
}

/// The single argument shape `process_request` dispatches on, kept as a
/// compatibility surface for callers still written against the
/// polymorphic `(data: Map | str)` contract. New callers should prefer
/// [`crate::SecretManager::store_secrets`] and
/// [`crate::SecretManager::retrieve_secret`] directly.
#[derive(Debug, Clone)]
pub enum RequestData {
    /// A store request: every key in the map is encrypted and
    /// persisted.
    Store(std::collections::BTreeMap<String, String>),
    /// A retrieve request for a single secret key.
    Retrieve(String),
}
