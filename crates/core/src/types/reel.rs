//! Shoppable short videos.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, ReelId, SellerId};

/// A short video that tags one or more products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reel {
    pub id: ReelId,
    pub video_url: String,
    pub caption: String,
    pub seller_id: SellerId,
    #[serde(default)]
    pub tagged_product_ids: Vec<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_generated: Option<bool>,
}

/// Fields supplied by a seller when publishing a reel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelDraft {
    pub caption: String,
    #[serde(default)]
    pub tagged_product_ids: Vec<ProductId>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub ai_generated: Option<bool>,
}

impl Reel {
    /// Build a reel with a fresh id.
    #[must_use]
    pub fn from_draft(draft: ReelDraft, video_url: String, seller_id: SellerId) -> Self {
        Self {
            id: ReelId::generate(),
            video_url,
            caption: draft.caption,
            seller_id,
            tagged_product_ids: draft.tagged_product_ids,
            script: draft.script,
            ai_generated: draft.ai_generated,
        }
    }

    /// Whether the reel tags `product`.
    #[must_use]
    pub fn tags_product(&self, product: &ProductId) -> bool {
        self.tagged_product_ids.contains(product)
    }
}
