//! Whole-snapshot key/value persistence.
//!
//! Every store persists its complete state under one key. Values are wrapped
//! in a versioned envelope:
//!
//! ```json
//! { "version": 1, "data": <store state> }
//! ```
//!
//! Blobs written before the envelope existed are bare JSON; they are read as
//! version 0 and carried forward unchanged, since the record shapes did not
//! change between the two versions. Reads never fail the caller: a backend
//! error, an unknown future version or a blob that no longer decodes is logged
//! and treated as "no data", and the store falls back to its fixtures.

mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::warn;

use crate::db::RepositoryError;

pub use memory::MemorySnapshotStorage;

/// Envelope version written by this build.
pub const SNAPSHOT_VERSION: u64 = 1;

/// Errors from a snapshot backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database backend failed.
    #[error("storage backend error: {0}")]
    Database(#[from] RepositoryError),

    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A key/value store of JSON snapshots.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the value stored under `key`.
    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage keys.
pub mod keys {
    use std::fmt::Display;

    /// Catalog snapshot.
    pub const PRODUCTS: &str = "products";
    /// Reel snapshot.
    pub const REELS: &str = "reels";
    /// All user accounts, keyed by email.
    pub const USERS: &str = "kala-connect-users";

    /// Per-visitor cart.
    pub fn cart(owner: impl Display) -> String {
        format!("kala-connect-cart/{owner}")
    }

    /// Per-visitor wishlist.
    pub fn wishlist(owner: impl Display) -> String {
        format!("kala-connect-wishlist/{owner}")
    }

    /// Per-visitor pointer to the signed-in account.
    pub fn auth(owner: impl Display) -> String {
        format!("kala-connect-auth/{owner}")
    }

    /// Per-visitor display locale.
    pub fn locale(owner: impl Display) -> String {
        format!("kala-connect-i18n-locale/{owner}")
    }
}

/// Split a stored value into `(version, data)`.
fn unwrap_envelope(value: Value) -> (u64, Value) {
    if let Value::Object(mut map) = value {
        let is_envelope = map.len() == 2 && map.contains_key("data");
        if let Some(version) = map.get("version").and_then(Value::as_u64).filter(|_| is_envelope) {
            let data = map.remove("data").unwrap_or(Value::Null);
            return (version, data);
        }
        return (0, Value::Object(map));
    }
    (0, value)
}

/// Read and decode the snapshot stored under `key`.
///
/// Returns `None` when the key is absent or the stored value cannot be used;
/// the latter is logged at `warn`.
pub async fn read_snapshot<T>(storage: &dyn SnapshotStorage, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    let value = match storage.load(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Could not read snapshot, falling back to defaults");
            return None;
        }
    };

    let (version, data) = unwrap_envelope(value);
    if version > SNAPSHOT_VERSION {
        warn!(key, version, "Snapshot written by a newer version, ignoring");
        return None;
    }

    match serde_json::from_value(data) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(key, version, error = %e, "Could not decode snapshot, falling back to defaults");
            None
        }
    }
}

/// Read the raw data of a snapshot without decoding it.
///
/// Used where stored values are merged with fixtures field by field.
pub async fn read_snapshot_value(storage: &dyn SnapshotStorage, key: &str) -> Option<Value> {
    match storage.load(key).await {
        Ok(Some(value)) => {
            let (version, data) = unwrap_envelope(value);
            if version > SNAPSHOT_VERSION {
                warn!(key, version, "Snapshot written by a newer version, ignoring");
                return None;
            }
            Some(data)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "Could not read snapshot, falling back to defaults");
            None
        }
    }
}

/// Encode `data` in the current envelope and write it under `key`.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the backend write fails.
pub async fn write_snapshot<T>(storage: &dyn SnapshotStorage, key: &str, data: &T) -> Result<(), StorageError>
where
    T: Serialize + Sync,
{
    let value = json!({
        "version": SNAPSHOT_VERSION,
        "data": serde_json::to_value(data)?,
    });
    storage.save(key, value).await
}
