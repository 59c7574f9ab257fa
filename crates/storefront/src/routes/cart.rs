//! Cart route handlers.
//!
//! The cart belongs to the visitor, signed in or not. Lines hold a snapshot of
//! the product taken when it was added; checkout reprices them.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kala_connect_core::{CartItem, CartSummary, ProductId, SharedCartId};

use crate::error::{ApiJson, AppError, Result};
use crate::middleware::Visitor;
use crate::state::AppState;

/// Cart lines with their totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub summary: CartSummary,
}

impl From<Vec<CartItem>> for CartView {
    fn from(items: Vec<CartItem>) -> Self {
        let summary = CartSummary::of(&items);
        Self { items, summary }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// New quantity for a cart line. Zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: i64,
}

impl SetQuantity {
    /// Units to keep, where `0` means drop the line.
    #[must_use]
    pub fn units(&self) -> u32 {
        u32::try_from(self.quantity.max(0)).unwrap_or(u32::MAX)
    }
}

/// A freshly shared cart link.
#[derive(Debug, Serialize)]
pub struct SharedCartLink {
    pub id: SharedCartId,
    pub path: String,
}

/// GET /api/cart
pub async fn show(State(state): State<AppState>, Visitor(visitor): Visitor) -> Json<CartView> {
    Json(state.carts().items(visitor).await.into())
}

/// POST /api/cart/items
#[instrument(skip(state), fields(product_id = %body.product_id, quantity = body.quantity))]
pub async fn add(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    ApiJson(body): ApiJson<AddToCart>,
) -> Result<Json<CartView>> {
    let product = state
        .products()
        .get(&body.product_id)
        .await
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let items = state.carts().add(visitor, product, body.quantity).await?;
    Ok(Json(items.into()))
}

/// PATCH /api/cart/items/{id}
///
/// A quantity of zero or less removes the line.
pub async fn update(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(product_id): Path<ProductId>,
    ApiJson(body): ApiJson<SetQuantity>,
) -> Result<Json<CartView>> {
    let items = state
        .carts()
        .update_quantity(visitor, &product_id, body.units())
        .await?;
    Ok(Json(items.into()))
}

/// DELETE /api/cart/items/{id}
pub async fn remove(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let items = state.carts().remove(visitor, &product_id).await?;
    Ok(Json(items.into()))
}

/// DELETE /api/cart
pub async fn clear(State(state): State<AppState>, Visitor(visitor): Visitor) -> Result<StatusCode> {
    state.carts().clear(visitor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cart/share
pub async fn share(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
) -> Result<(StatusCode, Json<SharedCartLink>)> {
    let items = state.carts().items(visitor).await;
    let id = state.shared_carts().share(items).await?;
    let path = format!("/cart/shared/{id}");
    Ok((StatusCode::CREATED, Json(SharedCartLink { id, path })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_quantity_means_remove() {
        assert_eq!(SetQuantity { quantity: -1 }.units(), 0);
        assert_eq!(SetQuantity { quantity: 0 }.units(), 0);
        assert_eq!(SetQuantity { quantity: 4 }.units(), 4);
        assert_eq!(SetQuantity { quantity: i64::MAX }.units(), u32::MAX);
    }
}
