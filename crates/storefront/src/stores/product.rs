//! Catalog store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, instrument, warn};

use kala_connect_core::{Product, ProductDraft, ProductId, Review, ReviewDraft, SellerId};

use super::StoreError;
use crate::fixtures;
use crate::storage::{SnapshotStorage, keys, read_snapshot_value, write_snapshot};

/// Month key used for sales records, `YYYY-MM`.
#[must_use]
pub fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

/// The product catalog.
pub struct ProductStore {
    storage: Arc<dyn SnapshotStorage>,
    products: OnceCell<Mutex<Vec<Product>>>,
}

impl ProductStore {
    /// Create a store over `storage`. Nothing is read until first use.
    #[must_use]
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self {
            storage,
            products: OnceCell::new(),
        }
    }

    async fn products(&self) -> &Mutex<Vec<Product>> {
        self.products
            .get_or_init(|| async { Mutex::new(self.hydrate().await) })
            .await
    }

    async fn hydrate(&self) -> Vec<Product> {
        let fixtures = fixtures::products();
        match read_snapshot_value(&*self.storage, keys::PRODUCTS).await {
            None => fixtures,
            Some(Value::Array(stored)) => merge_with_fixtures(stored, fixtures),
            Some(_) => {
                warn!("Stored catalog is not a list, using fixtures");
                fixtures
            }
        }
    }

    /// Apply `f` to a copy of the catalog, persist it, then commit it.
    async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Vec<Product>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut products = self.products().await.lock().await;
        let mut next = products.clone();
        let result = f(&mut next)?;
        write_snapshot(&*self.storage, keys::PRODUCTS, &next).await?;
        *products = next;
        Ok(result)
    }

    /// Every product, newest listings first.
    pub async fn list(&self) -> Vec<Product> {
        self.products().await.lock().await.clone()
    }

    /// Look up one product.
    pub async fn get(&self, id: &ProductId) -> Option<Product> {
        self.products()
            .await
            .lock()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    /// Products listed by one seller.
    pub async fn by_seller(&self, seller_id: &SellerId) -> Vec<Product> {
        self.products()
            .await
            .lock()
            .await
            .iter()
            .filter(|p| &p.seller_id == seller_id)
            .cloned()
            .collect()
    }

    /// List a new product at the top of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for a blank name or negative price, or
    /// `StoreError::Storage` if the catalog cannot be written.
    #[instrument(skip(self, draft, image), fields(name = %draft.name))]
    pub async fn add_product(
        &self,
        draft: ProductDraft,
        image: String,
        seller_id: SellerId,
    ) -> Result<Product, StoreError> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::Validation("Product name is required.".into()));
        }
        if draft.price.is_negative() {
            return Err(StoreError::Validation("Price cannot be negative.".into()));
        }

        let product = Product::from_draft(draft, image, seller_id);
        let listed = product.clone();
        self.mutate(move |products| {
            products.insert(0, product);
            Ok(())
        })
        .await?;

        info!(product_id = %listed.id, "Product listed");
        Ok(listed)
    }

    /// Append a review to a product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProductNotFound` for an unknown product,
    /// `StoreError::Validation` for a rating outside 1-5 or a blank author or
    /// comment, or `StoreError::Storage` on write failure.
    #[instrument(skip(self, draft), fields(product_id = %product_id, rating = draft.rating))]
    pub async fn add_review(&self, product_id: &ProductId, draft: ReviewDraft) -> Result<Review, StoreError> {
        if !(Review::MIN_RATING..=Review::MAX_RATING).contains(&draft.rating) {
            return Err(StoreError::Validation(format!(
                "Rating must be between {} and {}.",
                Review::MIN_RATING,
                Review::MAX_RATING
            )));
        }
        if draft.author.trim().is_empty() || draft.comment.trim().is_empty() {
            return Err(StoreError::Validation("Name and comment are required.".into()));
        }

        let review = Review::from_draft(draft);
        let added = review.clone();
        self.mutate(|products| {
            let product = products
                .iter_mut()
                .find(|p| &p.id == product_id)
                .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;
            product.reviews.push(review);
            Ok(())
        })
        .await?;

        Ok(added)
    }

    /// Record `quantity` units of one product sold this month.
    ///
    /// Stock saturates at zero.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProductNotFound` for an unknown product or
    /// `StoreError::Storage` on write failure.
    pub async fn record_sale(&self, product_id: &ProductId, quantity: u32) -> Result<Product, StoreError> {
        let month = current_month();
        self.mutate(|products| {
            let product = products
                .iter_mut()
                .find(|p| &p.id == product_id)
                .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;
            product.record_sale(quantity, &month);
            Ok(product.clone())
        })
        .await
    }

    /// Record a whole order's lines, all or nothing.
    ///
    /// Every line must name a listed product with at least `quantity` units in
    /// stock; otherwise nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProductNotFound` or `StoreError::InsufficientStock`
    /// for the first offending line, or `StoreError::Storage` on write failure.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn record_sales(&self, lines: &[(ProductId, u32)]) -> Result<(), StoreError> {
        let month = current_month();
        self.mutate(|products| {
            let mut wanted: HashMap<&ProductId, u32> = HashMap::new();
            for (id, quantity) in lines {
                *wanted.entry(id).or_default() += quantity;
            }
            for (id, quantity) in &wanted {
                let product = products
                    .iter()
                    .find(|p| &p.id == *id)
                    .ok_or_else(|| StoreError::ProductNotFound((*id).clone()))?;
                if product.stock < *quantity {
                    return Err(StoreError::InsufficientStock {
                        product: (*id).clone(),
                        available: product.stock,
                    });
                }
            }
            for (id, quantity) in lines {
                if let Some(product) = products.iter_mut().find(|p| &p.id == id) {
                    product.record_sale(*quantity, &month);
                }
            }
            Ok(())
        })
        .await
    }

    /// Undo [`Self::record_sales`] for lines whose order could not be placed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on write failure.
    pub async fn release_sales(&self, lines: &[(ProductId, u32)]) -> Result<(), StoreError> {
        let month = current_month();
        self.mutate(|products| {
            for (id, quantity) in lines {
                let Some(product) = products.iter_mut().find(|p| &p.id == id) else {
                    continue;
                };
                product.stock = product.stock.saturating_add(*quantity);
                if let Some(sale) = product.sales.iter_mut().find(|s| s.month == month) {
                    sale.units_sold = sale.units_sold.saturating_sub(*quantity);
                }
                product.sales.retain(|s| s.units_sold > 0);
            }
            Ok(())
        })
        .await
    }
}

/// Overlay stored products onto the fixtures, field by field.
///
/// Stored order wins. Fixture products missing from storage are appended, and
/// stored products with no fixture are kept as stored.
fn merge_with_fixtures(stored: Vec<Value>, fixtures: Vec<Product>) -> Vec<Product> {
    let mut fixture_values: HashMap<String, Value> = fixtures
        .iter()
        .filter_map(|p| serde_json::to_value(p).ok().map(|v| (p.id.to_string(), v)))
        .collect();

    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(stored.len().max(fixtures.len()));

    for value in stored {
        let Some(id) = value.get("id").and_then(Value::as_str).map(str::to_owned) else {
            warn!("Skipping stored product without an id");
            continue;
        };
        if seen.contains(&id) {
            continue;
        }

        let value = match fixture_values.remove(&id) {
            Some(base) => overlay(base, value),
            None => value,
        };
        match serde_json::from_value::<Product>(value) {
            Ok(product) => {
                seen.insert(id);
                merged.push(product);
            }
            Err(e) => warn!(product_id = %id, error = %e, "Skipping undecodable stored product"),
        }
    }

    merged.extend(fixtures.into_iter().filter(|p| !seen.contains(p.id.as_str())));
    merged
}

fn overlay(base: Value, top: Value) -> Value {
    match (base, top) {
        (Value::Object(mut base), Value::Object(top)) => {
            base.extend(top);
            Value::Object(base)
        }
        (_, top) => top,
    }
}
