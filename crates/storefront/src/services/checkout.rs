//! Checkout: the visitor's server-held cart becomes an order.
//!
//! Nothing the client sends besides the shipping address is trusted. Lines are
//! re-priced from the live catalog, stock is checked and reserved, and the
//! total and reward points are derived from those lines.

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use kala_connect_core::{CartItem, Email, Order, ProductId, ShippingAddress};

use crate::models::VisitorId;
use crate::services::auth::AuthError;
use crate::stores::{AuthStore, CartStore, ProductStore, StoreError};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// Required shipping fields are blank.
    #[error("Missing shipping details: {}", .0.join(", "))]
    InvalidAddress(Vec<&'static str>),

    /// A cart line names a product that is no longer listed.
    #[error("{0} is no longer available.")]
    ProductUnavailable(ProductId),

    /// A cart line asks for more units than are in stock.
    #[error("Only {available} left in stock for {product}.")]
    InsufficientStock { product: ProductId, available: u32 },

    /// The catalog or cart could not be updated.
    #[error(transparent)]
    Store(StoreError),

    /// The order could not be recorded on the account.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProductNotFound(id) => Self::ProductUnavailable(id),
            StoreError::InsufficientStock { product, available } => Self::InsufficientStock { product, available },
            other => Self::Store(other),
        }
    }
}

/// Checkout over the catalog, carts and accounts.
pub struct Checkout<'a> {
    products: &'a ProductStore,
    carts: &'a CartStore,
    accounts: &'a AuthStore,
}

impl<'a> Checkout<'a> {
    /// Create a checkout over the given stores.
    #[must_use]
    pub const fn new(products: &'a ProductStore, carts: &'a CartStore, accounts: &'a AuthStore) -> Self {
        Self {
            products,
            carts,
            accounts,
        }
    }

    /// Place an order for everything in `visitor`'s cart.
    ///
    /// On success stock is decremented, this month's sales are recorded, the
    /// order (status `Processing`) is added to the account with its reward
    /// points, and the cart is emptied.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidAddress`, `CheckoutError::EmptyCart`,
    /// `CheckoutError::ProductUnavailable` or `CheckoutError::InsufficientStock`
    /// before anything is written, and `CheckoutError::Store` or
    /// `CheckoutError::Auth` if a write fails.
    #[instrument(skip(self, address), fields(visitor = %visitor, email = %email))]
    pub async fn place_order(
        &self,
        visitor: VisitorId,
        email: &Email,
        address: ShippingAddress,
    ) -> Result<Order, CheckoutError> {
        let missing = address.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::InvalidAddress(missing));
        }

        let cart = self.carts.items(visitor).await;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut lines = Vec::with_capacity(cart.len());
        for item in cart {
            let product = self
                .products
                .get(&item.product.id)
                .await
                .ok_or_else(|| CheckoutError::ProductUnavailable(item.product.id.clone()))?;
            if product.stock < item.quantity {
                return Err(CheckoutError::InsufficientStock {
                    product: product.id,
                    available: product.stock,
                });
            }
            lines.push(CartItem {
                product,
                quantity: item.quantity,
            });
        }

        let sales: Vec<(ProductId, u32)> = lines.iter().map(|l| (l.product.id.clone(), l.quantity)).collect();
        self.products.record_sales(&sales).await?;

        let order = match self.accounts.place_order(email, lines, address).await {
            Ok(order) => order,
            Err(e) => {
                if let Err(release) = self.products.release_sales(&sales).await {
                    error!(error = %release, "Could not release stock after a failed order");
                }
                return Err(e.into());
            }
        };

        if let Err(e) = self.carts.clear(visitor).await {
            warn!(order_id = %order.id, error = %e, "Order placed but the cart could not be cleared");
        }

        info!(order_id = %order.id, total = %order.total, points = order.points_earned, "Checkout complete");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use kala_connect_core::Price;

    use super::*;
    use crate::fixtures;
    use crate::storage::MemorySnapshotStorage;

    struct Stores {
        products: ProductStore,
        carts: CartStore,
        accounts: AuthStore,
    }

    impl Stores {
        fn new() -> Self {
            let storage = Arc::new(MemorySnapshotStorage::new());
            Self {
                products: ProductStore::new(storage.clone()),
                carts: CartStore::new(storage.clone()),
                accounts: AuthStore::new(storage),
            }
        }

        fn checkout(&self) -> Checkout<'_> {
            Checkout::new(&self.products, &self.carts, &self.accounts)
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Meera".into(),
            address: "12 Lake Road".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411001".into(),
        }
    }

    fn buyer() -> Email {
        Email::parse(fixtures::DEMO_BUYER_EMAIL).unwrap()
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_clears_cart() {
        let stores = Stores::new();
        let visitor = VisitorId::generate();
        let p1 = stores.products.get(&ProductId::new("prod-1")).await.unwrap();
        let p6 = stores.products.get(&ProductId::new("prod-6")).await.unwrap();
        stores.carts.add(visitor, p1.clone(), 1).await.unwrap();
        stores.carts.add(visitor, p6.clone(), 1).await.unwrap();

        let order = stores.checkout().place_order(visitor, &buyer(), address()).await.unwrap();

        assert_eq!(order.total, Price::from_whole(2998));
        assert_eq!(order.points_earned, p1.sustainability_coins + p6.sustainability_coins);
        assert!(stores.carts.items(visitor).await.is_empty());
        assert_eq!(
            stores.products.get(&p1.id).await.unwrap().stock,
            p1.stock - 1
        );
    }

    #[tokio::test]
    async fn test_total_uses_live_catalog_price() {
        let stores = Stores::new();
        let visitor = VisitorId::generate();
        let mut stale = stores.products.get(&ProductId::new("prod-1")).await.unwrap();
        stale.price = Price::from_whole(1);
        stores.carts.add(visitor, stale, 2).await.unwrap();

        let order = stores.checkout().place_order(visitor, &buyer(), address()).await.unwrap();
        assert_eq!(order.total, Price::from_whole(1998));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let stores = Stores::new();
        let err = stores
            .checkout()
            .place_order(VisitorId::generate(), &buyer(), address())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let stores = Stores::new();
        let visitor = VisitorId::generate();
        let product = stores.products.get(&ProductId::new("prod-6")).await.unwrap();
        stores.carts.add(visitor, product.clone(), product.stock + 1).await.unwrap();

        let err = stores.checkout().place_order(visitor, &buyer(), address()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock { .. }));
        assert_eq!(stores.carts.items(visitor).await.len(), 1);
        assert_eq!(stores.products.get(&product.id).await.unwrap().stock, product.stock);
    }

    #[tokio::test]
    async fn test_blank_address_is_rejected() {
        let stores = Stores::new();
        let mut blank = address();
        blank.pincode = String::new();
        let err = stores
            .checkout()
            .place_order(VisitorId::generate(), &buyer(), blank)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidAddress(fields) if fields == vec!["pincode"]));
    }

    #[tokio::test]
    async fn test_failed_order_releases_stock() {
        let stores = Stores::new();
        let visitor = VisitorId::generate();
        let product = stores.products.get(&ProductId::new("prod-1")).await.unwrap();
        stores.carts.add(visitor, product.clone(), 1).await.unwrap();

        let ghost = Email::parse("ghost@example.com").unwrap();
        let err = stores.checkout().place_order(visitor, &ghost, address()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Auth(AuthError::UserNotFound)));
        assert_eq!(stores.products.get(&product.id).await.unwrap().stock, product.stock);
    }
}
