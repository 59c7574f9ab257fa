//! Shared carts: a cart snapshot published under a link that several people
//! can view and edit at once.
//!
//! Edits are computed against the latest document the editor knows about and
//! written back as a whole item list. When the write fails the caller gets a
//! [`UpdateOutcome::Diverged`] carrying the remote items, so a viewer reverts
//! to what is actually stored instead of drifting from it.

pub mod document;

use std::sync::Arc;

use chrono::Utc;
use futures::stream::BoxStream;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use kala_connect_core::cart;
use kala_connect_core::{CartItem, ProductId, SharedCartId};

pub use document::{DocumentStore, DocumentStoreError, MemoryDocumentStore, SharedCartDocument, Subscription};

/// Length of generated shared cart ids.
pub const SHARED_CART_ID_LENGTH: usize = 20;

/// Errors from shared cart operations.
#[derive(Debug, Error)]
pub enum SharedCartError {
    /// The cart to share has no lines.
    #[error("Cannot share an empty cart.")]
    EmptyCart,

    /// The document could not be created.
    #[error("Could not create a shareable cart link.")]
    CreateFailed,

    /// No shared cart exists with this id.
    #[error("Shared cart not found")]
    NotFound(SharedCartId),

    /// The document backend failed.
    #[error("shared cart storage error: {0}")]
    Document(#[from] DocumentStoreError),
}

/// Result of an edit to a shared cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum UpdateOutcome {
    /// The edit was committed; these are the stored items.
    Applied { items: Vec<CartItem> },
    /// The edit could not be written; these are the items actually stored.
    Diverged { items: Vec<CartItem> },
}

impl UpdateOutcome {
    /// The items the viewer should now display.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        match self {
            Self::Applied { items } | Self::Diverged { items } => items,
        }
    }
}

/// Generate a shared cart id: 20 random alphanumeric characters.
#[must_use]
pub fn generate_id() -> SharedCartId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SHARED_CART_ID_LENGTH)
        .map(char::from)
        .collect();
    SharedCartId::new(id)
}

/// Shared cart operations over a [`DocumentStore`].
#[derive(Clone)]
pub struct SharedCartService {
    documents: Arc<dyn DocumentStore>,
}

impl SharedCartService {
    /// Create a service over a document backend.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Publish `items` under a new shared cart id.
    ///
    /// # Errors
    ///
    /// Returns `SharedCartError::EmptyCart` for an empty cart and
    /// `SharedCartError::CreateFailed` if the document cannot be written.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn share(&self, items: Vec<CartItem>) -> Result<SharedCartId, SharedCartError> {
        if items.is_empty() {
            return Err(SharedCartError::EmptyCart);
        }

        let id = generate_id();
        let document = SharedCartDocument {
            items,
            created_at: Utc::now(),
        };

        if let Err(e) = self.documents.create(&id, &document).await {
            error!(error = %e, "Error creating shared cart");
            return Err(SharedCartError::CreateFailed);
        }

        info!(cart_id = %id, "Shared cart created");
        Ok(id)
    }

    /// Fetch a shared cart.
    ///
    /// # Errors
    ///
    /// Returns `SharedCartError::NotFound` if no document exists for `id`.
    pub async fn get(&self, id: &SharedCartId) -> Result<SharedCartDocument, SharedCartError> {
        self.documents
            .get(id)
            .await?
            .ok_or_else(|| SharedCartError::NotFound(id.clone()))
    }

    /// Set the quantity of one line. A quantity of zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `SharedCartError::NotFound` if the cart does not exist, or
    /// `SharedCartError::Document` if neither the write nor the follow-up
    /// read succeed.
    #[instrument(skip(self), fields(cart_id = %id, product_id = %product_id))]
    pub async fn update_item_quantity(
        &self,
        id: &SharedCartId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<UpdateOutcome, SharedCartError> {
        let mut items = self.get(id).await?.items;
        cart::set_quantity(&mut items, product_id, quantity);
        self.commit(id, items).await
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_item_quantity`].
    #[instrument(skip(self), fields(cart_id = %id, product_id = %product_id))]
    pub async fn remove_item(
        &self,
        id: &SharedCartId,
        product_id: &ProductId,
    ) -> Result<UpdateOutcome, SharedCartError> {
        let mut items = self.get(id).await?.items;
        cart::remove_item(&mut items, product_id);
        self.commit(id, items).await
    }

    async fn commit(&self, id: &SharedCartId, items: Vec<CartItem>) -> Result<UpdateOutcome, SharedCartError> {
        match self.documents.merge_items(id, &items).await {
            Ok(committed) => Ok(UpdateOutcome::Applied {
                items: committed.items,
            }),
            Err(DocumentStoreError::NotFound(_)) => Err(SharedCartError::NotFound(id.clone())),
            Err(e) => {
                warn!(cart_id = %id, error = %e, "Failed to update shared cart, reverting to remote items");
                let remote = self.get(id).await?;
                Ok(UpdateOutcome::Diverged { items: remote.items })
            }
        }
    }

    /// Stream the cart: the current document first, then every committed change.
    ///
    /// # Errors
    ///
    /// Returns `SharedCartError::NotFound` if the cart does not exist.
    pub async fn subscribe(
        &self,
        id: &SharedCartId,
    ) -> Result<BoxStream<'static, SharedCartDocument>, SharedCartError> {
        // Subscribe before reading so no commit falls between the two.
        let mut subscription = self.documents.subscribe(id).await?;
        let current = self.get(id).await?;

        let stream = async_stream::stream! {
            yield current;
            while let Some(document) = subscription.next().await {
                yield document;
            }
        };
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use futures::StreamExt;
    use kala_connect_core::{Price, Product, ProductDraft};

    use super::*;
    use crate::db::RepositoryError;

    fn item(id: &str, quantity: u32) -> CartItem {
        let mut product = Product::from_draft(
            ProductDraft {
                name: "Blue Pottery Vase".into(),
                description: String::new(),
                price: Price::from_whole(999),
                original_price: None,
                tags: Vec::new(),
                cultural_context: None,
                color: None,
                sustainability_coins: 20,
                stock: 5,
            },
            String::new(),
            "seller-1".into(),
        );
        product.id = ProductId::new(id);
        CartItem { product, quantity }
    }

    fn service() -> SharedCartService {
        SharedCartService::new(Arc::new(MemoryDocumentStore::new()))
    }

    /// Reads succeed, writes to existing documents fail.
    struct ReadOnlyAfterCreate(MemoryDocumentStore);

    #[async_trait]
    impl DocumentStore for ReadOnlyAfterCreate {
        async fn create(&self, id: &SharedCartId, document: &SharedCartDocument) -> Result<(), DocumentStoreError> {
            self.0.create(id, document).await
        }

        async fn get(&self, id: &SharedCartId) -> Result<Option<SharedCartDocument>, DocumentStoreError> {
            self.0.get(id).await
        }

        async fn merge_items(&self, _id: &SharedCartId, _items: &[CartItem]) -> Result<SharedCartDocument, DocumentStoreError> {
            Err(RepositoryError::DataCorruption("write rejected".into()).into())
        }

        async fn subscribe(&self, id: &SharedCartId) -> Result<Subscription, DocumentStoreError> {
            self.0.subscribe(id).await
        }
    }

    #[tokio::test]
    async fn test_share_empty_cart_fails() {
        let err = service().share(Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot share an empty cart.");
    }

    #[tokio::test]
    async fn test_share_generates_alphanumeric_id() {
        let service = service();
        let id = service.share(vec![item("prod-1", 1)]).await.unwrap();
        assert_eq!(id.as_str().len(), SHARED_CART_ID_LENGTH);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));

        let document = service.get(&id).await.unwrap();
        assert_eq!(document.items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let service = service();
        let id = service.share(vec![item("prod-1", 2), item("prod-4", 1)]).await.unwrap();

        let outcome = service
            .update_item_quantity(&id, &ProductId::new("prod-1"), 0)
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Applied { .. }));
        assert_eq!(outcome.items().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_reports_remote_items() {
        let service = SharedCartService::new(Arc::new(ReadOnlyAfterCreate(MemoryDocumentStore::new())));
        let id = service.share(vec![item("prod-1", 2)]).await.unwrap();

        let outcome = service.remove_item(&id, &ProductId::new("prod-1")).await.unwrap();
        match outcome {
            UpdateOutcome::Diverged { items } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items.first().map(|i| i.quantity), Some(2));
            }
            UpdateOutcome::Applied { .. } => panic!("write should not have applied"),
        }
    }

    #[tokio::test]
    async fn test_unknown_cart_is_not_found() {
        let err = service()
            .update_item_quantity(&SharedCartId::new("nope"), &ProductId::new("prod-1"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SharedCartError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_subscriber_observes_concurrent_edit() {
        let service = service();
        let id = service.share(vec![item("prod-1", 1)]).await.unwrap();

        let mut stream = service.subscribe(&id).await.unwrap();
        let initial = stream.next().await.unwrap();
        assert_eq!(initial.items.first().map(|i| i.quantity), Some(1));

        service
            .update_item_quantity(&id, &ProductId::new("prod-1"), 3)
            .await
            .unwrap();

        let updated = stream.next().await.unwrap();
        assert_eq!(updated.items.first().map(|i| i.quantity), Some(3));
    }
}
