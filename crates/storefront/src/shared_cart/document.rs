//! Realtime document storage for shared carts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use kala_connect_core::{CartItem, SharedCartId};

use crate::db::RepositoryError;

/// Buffered updates per subscriber before it starts skipping to the latest.
pub(crate) const SUBSCRIPTION_BUFFER: usize = 16;

/// A shared cart as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCartDocument {
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
}

/// Errors from a document backend.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// The document does not exist.
    #[error("shared cart {0} not found")]
    NotFound(SharedCartId),

    /// A document with this id already exists.
    #[error("shared cart {0} already exists")]
    AlreadyExists(SharedCartId),

    /// The database backend failed.
    #[error("document backend error: {0}")]
    Database(#[from] RepositoryError),

    /// A stored document could not be encoded or decoded.
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A store of shared cart documents with change subscriptions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a new document.
    async fn create(&self, id: &SharedCartId, document: &SharedCartDocument) -> Result<(), DocumentStoreError>;

    /// Fetch a document.
    async fn get(&self, id: &SharedCartId) -> Result<Option<SharedCartDocument>, DocumentStoreError>;

    /// Replace the items of an existing document, leaving `createdAt` as is.
    ///
    /// Returns the committed document.
    async fn merge_items(&self, id: &SharedCartId, items: &[CartItem]) -> Result<SharedCartDocument, DocumentStoreError>;

    /// Receive every document committed for `id` from now on.
    async fn subscribe(&self, id: &SharedCartId) -> Result<Subscription, DocumentStoreError>;
}

/// Live feed of committed documents. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<SharedCartDocument>,
}

impl Subscription {
    pub(crate) const fn new(receiver: broadcast::Receiver<SharedCartDocument>) -> Self {
        Self { receiver }
    }

    /// Wait for the next committed document.
    ///
    /// A subscriber that falls behind skips straight to newer documents.
    /// Returns `None` once the backend shuts the feed down.
    pub async fn next(&mut self) -> Option<SharedCartDocument> {
        loop {
            match self.receiver.recv().await {
                Ok(document) => return Some(document),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Shared cart subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Per-id broadcast channels shared by the document backends.
#[derive(Debug, Default)]
pub(crate) struct Channels {
    senders: Mutex<HashMap<SharedCartId, broadcast::Sender<SharedCartDocument>>>,
}

impl Channels {
    pub(crate) fn subscribe(&self, id: &SharedCartId) -> Subscription {
        let mut senders = self.senders.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let receiver = senders
            .entry(id.clone())
            .or_insert_with(|| broadcast::channel(SUBSCRIPTION_BUFFER).0)
            .subscribe();
        Subscription::new(receiver)
    }

    /// Whether anyone is listening on `id`.
    pub(crate) fn has_subscribers(&self, id: &SharedCartId) -> bool {
        let senders = self.senders.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        senders.get(id).is_some_and(|s| s.receiver_count() > 0)
    }

    /// Deliver `document` to the subscribers of `id`, dropping idle channels.
    pub(crate) fn publish(&self, id: &SharedCartId, document: SharedCartDocument) {
        let mut senders = self.senders.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sender) = senders.get(id)
            && sender.send(document).is_err()
        {
            senders.remove(id);
        }
    }
}

/// Process-local document store used in demo mode and tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: tokio::sync::RwLock<HashMap<SharedCartId, SharedCartDocument>>,
    channels: Channels,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, id: &SharedCartId, document: &SharedCartDocument) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(id) {
            return Err(DocumentStoreError::AlreadyExists(id.clone()));
        }
        documents.insert(id.clone(), document.clone());
        // Publish under the write lock so subscribers see commits in order
        self.channels.publish(id, document.clone());
        drop(documents);
        Ok(())
    }

    async fn get(&self, id: &SharedCartId) -> Result<Option<SharedCartDocument>, DocumentStoreError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn merge_items(&self, id: &SharedCartId, items: &[CartItem]) -> Result<SharedCartDocument, DocumentStoreError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| DocumentStoreError::NotFound(id.clone()))?;
        document.items = items.to_vec();
        let committed = document.clone();
        self.channels.publish(id, committed.clone());
        drop(documents);
        Ok(committed)
    }

    async fn subscribe(&self, id: &SharedCartId) -> Result<Subscription, DocumentStoreError> {
        Ok(self.channels.subscribe(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn empty_document() -> SharedCartDocument {
        SharedCartDocument {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_merge_keeps_created_at() {
        let store = MemoryDocumentStore::new();
        let id = SharedCartId::new("abc");
        let document = empty_document();
        store.create(&id, &document).await.unwrap();

        let merged = store.merge_items(&id, &[]).await.unwrap();
        assert_eq!(merged.created_at, document.created_at);
    }

    #[tokio::test]
    async fn test_merge_unknown_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = store.merge_items(&SharedCartId::new("missing"), &[]).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_subscriber_sees_commits() {
        let store = MemoryDocumentStore::new();
        let id = SharedCartId::new("abc");
        store.create(&id, &empty_document()).await.unwrap();

        let mut subscription = store.subscribe(&id).await.unwrap();
        store.merge_items(&id, &[]).await.unwrap();

        let seen = subscription.next().await.unwrap();
        assert!(seen.items.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commits_reach_subscribers_in_commit_order() {
        let store = std::sync::Arc::new(MemoryDocumentStore::new());
        let id = SharedCartId::new("busy");
        store.create(&id, &empty_document()).await.unwrap();
        let mut subscription = store.subscribe(&id).await.unwrap();

        let product = crate::fixtures::products().remove(0);
        let writers: Vec<_> = (1..=8u32)
            .map(|quantity| {
                let store = store.clone();
                let id = id.clone();
                let items = vec![CartItem {
                    product: product.clone(),
                    quantity,
                }];
                tokio::spawn(async move { store.merge_items(&id, &items).await.unwrap() })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let mut last = None;
        for _ in 0..8 {
            last = subscription.next().await;
        }
        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(last, Some(stored));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let store = MemoryDocumentStore::new();
        let id = SharedCartId::new("abc");
        store.create(&id, &empty_document()).await.unwrap();
        let err = store.create(&id, &empty_document()).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::AlreadyExists(_)));
    }
}
