//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use kala_connect_core::{Product, ProductId};

use crate::error::Result;
use crate::middleware::Visitor;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub product_ids: Vec<ProductId>,
    /// Wishlisted products still in the catalog.
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResult {
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

/// GET /api/wishlist
pub async fn show(State(state): State<AppState>, Visitor(visitor): Visitor) -> Json<WishlistView> {
    let product_ids = state.wishlists().list(visitor).await;
    let catalog = state.products().list().await;
    let products = product_ids
        .iter()
        .filter_map(|id| catalog.iter().find(|p| &p.id == id).cloned())
        .collect();
    Json(WishlistView { product_ids, products })
}

/// POST /api/wishlist/{id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ToggleResult>> {
    let in_wishlist = state.wishlists().toggle(visitor, product_id.clone()).await?;
    Ok(Json(ToggleResult {
        product_id,
        in_wishlist,
    }))
}

/// DELETE /api/wishlist/{id}
pub async fn remove(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    state.wishlists().remove(visitor, &product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
