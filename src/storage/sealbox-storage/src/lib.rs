//! # sealbox-storage
//!
//! Storage Backend abstraction: the `AppKeyStore`/`SecretStore` traits,
//! their record types, and the shared error taxonomy. Concrete drivers
//! live in `sealbox-storage-sql` (relational) and `sealbox-storage-mongo`
//! (document) — this crate has no I/O of its own.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod records;

pub use backend::{AppKeyStore, SecretStore};
pub use error::StorageError;
pub use records::{AppKeyRecord, SecretVersionRecord};
