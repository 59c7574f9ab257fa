//! Application state stores.
//!
//! Each store owns one kind of state and persists it as a whole snapshot
//! through [`SnapshotStorage`]:
//!
//! - Global stores ([`ProductStore`], [`ReelStore`], [`AuthStore`]) hydrate
//!   once, on first use, from storage or their fixtures, and keep the
//!   hydrated state in memory behind an async lock.
//! - Per-visitor stores ([`CartStore`], [`WishlistStore`], [`LocaleStore`])
//!   read the visitor's snapshot on every call.
//!
//! A mutation is applied to a copy of the state, the copy is written back, and
//! only then does it replace the in-memory state. A failed write leaves both
//! unchanged. Last writer wins across processes.

pub mod auth;
pub mod cart;
pub mod locale;
pub mod product;
pub mod reel;
pub mod wishlist;

use thiserror::Error;

use kala_connect_core::{OrderId, ProductId};

use crate::storage::StorageError;

pub use auth::AuthStore;
pub use cart::CartStore;
pub use locale::{DEFAULT_LOCALE, LocaleStore, SUPPORTED_LOCALES};
pub use product::ProductStore;
pub use reel::ReelStore;
pub use wishlist::WishlistStore;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The snapshot could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// No product with this id.
    #[error("Product not found")]
    ProductNotFound(ProductId),

    /// No order with this id on the account.
    #[error("Order not found")]
    OrderNotFound(OrderId),

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Locale is not one of [`SUPPORTED_LOCALES`].
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// Not enough stock to record a sale.
    #[error("Only {available} left in stock for {product}")]
    InsufficientStock {
        product: ProductId,
        available: u32,
    },
}
