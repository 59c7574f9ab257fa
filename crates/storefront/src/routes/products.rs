//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use kala_connect_core::{Product, ProductDraft, ProductId, Review, ReviewDraft, SellerId};

use crate::error::{ApiJson, AppError, Result, add_breadcrumb};
use crate::middleware::RequireSeller;
use crate::state::AppState;

/// Catalog filters.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub seller: Option<SellerId>,
}

/// A product listed from the seller dashboard.
#[derive(Debug, Deserialize)]
pub struct NewProduct {
    #[serde(flatten)]
    pub draft: ProductDraft,
    /// Image URL or data URI from the upload.
    pub image: String,
}

/// GET /api/products
pub async fn index(State(state): State<AppState>, Query(query): Query<ProductQuery>) -> Json<Vec<Product>> {
    let products = match query.seller {
        Some(seller) => state.products().by_seller(&seller).await,
        None => state.products().list().await,
    };
    Json(products)
}

/// GET /api/products/{id}
pub async fn show(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    state
        .products()
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// POST /api/products
///
/// # Errors
///
/// Rejects non-sellers and invalid drafts.
#[instrument(skip_all, fields(name = %body.draft.name))]
pub async fn create(
    State(state): State<AppState>,
    seller: RequireSeller,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if body.image.trim().is_empty() {
        return Err(AppError::BadRequest("A product image is required.".to_string()));
    }
    let product = state
        .products()
        .add_product(body.draft, body.image, seller.seller_id)
        .await?;
    add_breadcrumb("dashboard", "Listed product", &[("product_id", product.id.as_str())]);
    Ok((StatusCode::CREATED, Json(product)))
}

/// POST /api/products/{id}/reviews
pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    ApiJson(draft): ApiJson<ReviewDraft>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state.products().add_review(&id, draft).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
