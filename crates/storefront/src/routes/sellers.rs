//! Seller profile route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use kala_connect_core::{Product, Reel, Seller, SellerId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// A seller's storefront page.
#[derive(Debug, Serialize)]
pub struct SellerProfile {
    #[serde(flatten)]
    pub seller: Seller,
    pub products: Vec<Product>,
    pub reels: Vec<Reel>,
}

/// GET /api/sellers
pub async fn index(State(state): State<AppState>) -> Json<Vec<Seller>> {
    Json(state.sellers().to_vec())
}

/// GET /api/sellers/{id}
pub async fn show(State(state): State<AppState>, Path(id): Path<SellerId>) -> Result<Json<SellerProfile>> {
    let seller = state
        .seller(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Seller not found".to_string()))?;
    let products = state.products().by_seller(&id).await;
    let reels = state
        .reels()
        .list()
        .await
        .into_iter()
        .filter(|reel| reel.seller_id == id)
        .collect();
    Ok(Json(SellerProfile {
        seller,
        products,
        reels,
    }))
}
