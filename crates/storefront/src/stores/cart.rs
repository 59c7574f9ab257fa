//! Per-visitor shopping carts.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use kala_connect_core::cart;
use kala_connect_core::{CartItem, CartSummary, Product, ProductId};

use super::StoreError;
use crate::models::VisitorId;
use crate::storage::{SnapshotStorage, keys, read_snapshot, write_snapshot};

/// Carts keyed by visitor.
pub struct CartStore {
    storage: Arc<dyn SnapshotStorage>,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl CartStore {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// The visitor's cart lines. An absent or unreadable cart is empty.
    pub async fn items(&self, owner: VisitorId) -> Vec<CartItem> {
        read_snapshot(&*self.storage, &keys::cart(owner))
            .await
            .unwrap_or_default()
    }

    /// Totals for the visitor's cart.
    pub async fn summary(&self, owner: VisitorId) -> CartSummary {
        CartSummary::of(&self.items(owner).await)
    }

    async fn mutate(
        &self,
        owner: VisitorId,
        f: impl FnOnce(&mut Vec<CartItem>),
    ) -> Result<Vec<CartItem>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.items(owner).await;
        f(&mut items);
        write_snapshot(&*self.storage, &keys::cart(owner), &items).await?;
        Ok(items)
    }

    /// Add `quantity` units of `product`. A product already in the cart has
    /// its quantity incremented.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for a zero quantity or
    /// `StoreError::Storage` on write failure.
    pub async fn add(&self, owner: VisitorId, product: Product, quantity: u32) -> Result<Vec<CartItem>, StoreError> {
        if quantity == 0 {
            return Err(StoreError::Validation("Quantity must be at least 1.".into()));
        }
        debug!(product_id = %product.id, quantity, "Adding to cart");
        self.mutate(owner, |items| cart::add_item(items, product, quantity)).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn remove(&self, owner: VisitorId, product_id: &ProductId) -> Result<Vec<CartItem>, StoreError> {
        self.mutate(owner, |items| {
            cart::remove_item(items, product_id);
        })
        .await
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn update_quantity(
        &self,
        owner: VisitorId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartItem>, StoreError> {
        self.mutate(owner, |items| {
            cart::set_quantity(items, product_id, quantity);
        })
        .await
    }

    /// Replace the whole cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn replace(&self, owner: VisitorId, items: Vec<CartItem>) -> Result<Vec<CartItem>, StoreError> {
        self.mutate(owner, |current| *current = items).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn clear(&self, owner: VisitorId) -> Result<(), StoreError> {
        self.mutate(owner, Vec::clear).await.map(drop)
    }
}
