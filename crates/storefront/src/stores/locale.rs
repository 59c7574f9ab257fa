//! Per-visitor display locale.

use std::sync::Arc;

use super::StoreError;
use crate::models::VisitorId;
use crate::storage::{SnapshotStorage, keys, read_snapshot, write_snapshot};

/// Locale used when none is stored.
pub const DEFAULT_LOCALE: &str = "en";

/// Locales the storefront is translated into.
pub const SUPPORTED_LOCALES: [&str; 10] = ["en", "hi", "mr", "bn", "kn", "or", "pa", "ta", "te", "ur"];

fn supported(locale: &str) -> Option<&'static str> {
    SUPPORTED_LOCALES.iter().copied().find(|l| *l == locale)
}

/// Locale preference keyed by visitor.
pub struct LocaleStore {
    storage: Arc<dyn SnapshotStorage>,
}

impl LocaleStore {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self { storage }
    }

    /// The visitor's locale. Missing or unsupported values read as `en`.
    pub async fn get(&self, owner: VisitorId) -> &'static str {
        read_snapshot::<String>(&*self.storage, &keys::locale(owner))
            .await
            .as_deref()
            .and_then(supported)
            .unwrap_or(DEFAULT_LOCALE)
    }

    /// Store the visitor's locale.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnsupportedLocale` for a locale outside
    /// [`SUPPORTED_LOCALES`], or `StoreError::Storage` on write failure.
    pub async fn set(&self, owner: VisitorId, locale: &str) -> Result<&'static str, StoreError> {
        let locale = supported(locale).ok_or_else(|| StoreError::UnsupportedLocale(locale.to_owned()))?;
        write_snapshot(&*self.storage, &keys::locale(owner), &locale).await?;
        Ok(locale)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::MemorySnapshotStorage;

    #[tokio::test]
    async fn test_default_and_set() {
        let store = LocaleStore::new(Arc::new(MemorySnapshotStorage::new()));
        let owner = VisitorId::generate();
        assert_eq!(store.get(owner).await, "en");

        store.set(owner, "ta").await.unwrap();
        assert_eq!(store.get(owner).await, "ta");

        let err = store.set(owner, "fr").await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedLocale(_)));
    }

    #[tokio::test]
    async fn test_unsupported_stored_value_falls_back() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        let owner = VisitorId::generate();
        storage.save(&keys::locale(owner), json!("de")).await.unwrap();

        assert_eq!(LocaleStore::new(storage).get(owner).await, DEFAULT_LOCALE);
    }
}
