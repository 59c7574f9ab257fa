//! Shoppable reels.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::info;

use kala_connect_core::{Reel, ReelDraft, SellerId};

use super::StoreError;
use crate::fixtures;
use crate::storage::{SnapshotStorage, keys, read_snapshot, write_snapshot};

/// Reels, newest first.
pub struct ReelStore {
    storage: Arc<dyn SnapshotStorage>,
    reels: OnceCell<Mutex<Vec<Reel>>>,
}

impl ReelStore {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self {
            storage,
            reels: OnceCell::new(),
        }
    }

    async fn reels(&self) -> &Mutex<Vec<Reel>> {
        self.reels
            .get_or_init(|| async {
                let reels = read_snapshot(&*self.storage, keys::REELS)
                    .await
                    .unwrap_or_else(fixtures::reels);
                Mutex::new(reels)
            })
            .await
    }

    /// Every reel.
    pub async fn list(&self) -> Vec<Reel> {
        self.reels().await.lock().await.clone()
    }

    /// Publish a reel at the top of the feed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for a blank caption or video, or
    /// `StoreError::Storage` on write failure.
    pub async fn add_reel(&self, draft: ReelDraft, video_url: String, seller_id: SellerId) -> Result<Reel, StoreError> {
        if draft.caption.trim().is_empty() {
            return Err(StoreError::Validation("Caption is required.".into()));
        }
        if video_url.trim().is_empty() {
            return Err(StoreError::Validation("A video is required.".into()));
        }

        let reel = Reel::from_draft(draft, video_url, seller_id);
        let mut reels = self.reels().await.lock().await;
        let mut next = Vec::with_capacity(reels.len() + 1);
        next.push(reel.clone());
        next.extend(reels.iter().cloned());
        write_snapshot(&*self.storage, keys::REELS, &next).await?;
        *reels = next;

        info!(reel_id = %reel.id, "Reel published");
        Ok(reel)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kala_connect_core::ProductId;

    use super::*;
    use crate::storage::MemorySnapshotStorage;

    #[tokio::test]
    async fn test_new_reel_is_first() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        let store = ReelStore::new(storage.clone());
        assert_eq!(store.list().await.len(), fixtures::reels().len());

        let reel = store
            .add_reel(
                ReelDraft {
                    caption: "Fresh off the loom".into(),
                    tagged_product_ids: vec![ProductId::new("prod-2")],
                    script: None,
                    ai_generated: Some(true),
                },
                "data:video/mp4;base64,AAAA".into(),
                SellerId::new("seller-1"),
            )
            .await
            .unwrap();

        assert!(reel.id.as_str().starts_with("reel-"));
        let reloaded = ReelStore::new(storage).list().await;
        assert_eq!(reloaded.first().map(|r| r.id.clone()), Some(reel.id));
        assert_eq!(reloaded.len(), fixtures::reels().len() + 1);
    }

    #[tokio::test]
    async fn test_blank_caption_is_rejected() {
        let store = ReelStore::new(Arc::new(MemorySnapshotStorage::new()));
        let err = store
            .add_reel(
                ReelDraft {
                    caption: "  ".into(),
                    tagged_product_ids: Vec::new(),
                    script: None,
                    ai_generated: None,
                },
                "url".into(),
                SellerId::new("seller-1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
