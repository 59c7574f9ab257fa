//! Per-visitor wishlists, stored as a list of product ids.

use std::sync::Arc;

use tokio::sync::Mutex;

use kala_connect_core::ProductId;

use super::StoreError;
use crate::models::VisitorId;
use crate::storage::{SnapshotStorage, keys, read_snapshot, write_snapshot};

/// Wishlists keyed by visitor.
pub struct WishlistStore {
    storage: Arc<dyn SnapshotStorage>,
    write_lock: Mutex<()>,
}

impl WishlistStore {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Wishlisted product ids in the order they were added.
    pub async fn list(&self, owner: VisitorId) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = read_snapshot(&*self.storage, &keys::wishlist(owner))
            .await
            .unwrap_or_default();
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
        ids
    }

    /// Whether `product_id` is on the wishlist.
    pub async fn contains(&self, owner: VisitorId, product_id: &ProductId) -> bool {
        self.list(owner).await.contains(product_id)
    }

    async fn mutate<R>(&self, owner: VisitorId, f: impl FnOnce(&mut Vec<ProductId>) -> R) -> Result<R, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.list(owner).await;
        let result = f(&mut ids);
        write_snapshot(&*self.storage, &keys::wishlist(owner), &ids).await?;
        Ok(result)
    }

    /// Add a product. Adding one already present changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn add(&self, owner: VisitorId, product_id: ProductId) -> Result<(), StoreError> {
        self.mutate(owner, |ids| {
            if !ids.contains(&product_id) {
                ids.push(product_id);
            }
        })
        .await
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn remove(&self, owner: VisitorId, product_id: &ProductId) -> Result<(), StoreError> {
        self.mutate(owner, |ids| ids.retain(|id| id != product_id)).await
    }

    /// Add the product if absent, remove it if present.
    ///
    /// Returns whether the product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn toggle(&self, owner: VisitorId, product_id: ProductId) -> Result<bool, StoreError> {
        self.mutate(owner, |ids| {
            if let Some(pos) = ids.iter().position(|id| *id == product_id) {
                ids.remove(pos);
                false
            } else {
                ids.push(product_id);
                true
            }
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::MemorySnapshotStorage;

    #[tokio::test]
    async fn test_toggle_twice_is_identity() {
        let store = WishlistStore::new(Arc::new(MemorySnapshotStorage::new()));
        let owner = VisitorId::generate();
        store.add(owner, ProductId::new("prod-2")).await.unwrap();
        let before = store.list(owner).await;

        assert!(store.toggle(owner, ProductId::new("prod-5")).await.unwrap());
        assert!(store.contains(owner, &ProductId::new("prod-5")).await);
        assert!(!store.toggle(owner, ProductId::new("prod-5")).await.unwrap());

        assert_eq!(store.list(owner).await, before);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let store = WishlistStore::new(Arc::new(MemorySnapshotStorage::new()));
        let owner = VisitorId::generate();
        store.add(owner, ProductId::new("prod-1")).await.unwrap();
        store.add(owner, ProductId::new("prod-1")).await.unwrap();
        assert_eq!(store.list(owner).await.len(), 1);

        store.remove(owner, &ProductId::new("prod-1")).await.unwrap();
        assert!(store.list(owner).await.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_list_with_duplicates_is_deduplicated() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        let owner = VisitorId::generate();
        storage
            .save(&keys::wishlist(owner), json!(["prod-1", "prod-3", "prod-1"]))
            .await
            .unwrap();

        let store = WishlistStore::new(storage);
        assert_eq!(
            store.list(owner).await,
            vec![ProductId::new("prod-1"), ProductId::new("prod-3")]
        );
    }
}
