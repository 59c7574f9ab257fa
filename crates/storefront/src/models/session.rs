//! Session-related types.
//!
//! Every browser gets a visitor id on its first request. Per-visitor
//! snapshots (cart, wishlist, locale and the signed-in account pointer) are
//! keyed by it.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anonymous identity of one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(Uuid);

impl VisitorId {
    /// Generate a new random visitor id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Session keys.
pub mod keys {
    /// Key for the visitor id.
    pub const VISITOR_ID: &str = "visitor_id";
}
