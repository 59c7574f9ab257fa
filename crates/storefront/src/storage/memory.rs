use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{SnapshotStorage, StorageError};

/// Process-local snapshot storage used in demo mode and tests.
#[derive(Debug, Default)]
pub struct MemorySnapshotStorage {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemorySnapshotStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStorage for MemorySnapshotStorage {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
