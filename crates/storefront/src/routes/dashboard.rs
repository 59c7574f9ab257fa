//! Seller dashboard overview and order fulfilment.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

use kala_connect_core::{Order, OrderId, SellerOverview};

use crate::error::{ApiJson, Result, add_breadcrumb};
use crate::middleware::RequireSeller;
use crate::routes::account::StatusUpdate;
use crate::state::AppState;

/// GET /api/dashboard
pub async fn overview(State(state): State<AppState>, seller: RequireSeller) -> Json<SellerOverview> {
    let products = state.products().by_seller(&seller.seller_id).await;
    let accounts = state.auth().all_users().await;
    Json(SellerOverview::compute(&seller.seller_id, &products, &accounts))
}

/// POST /api/dashboard/orders/{id}/status
///
/// Moves a buyer's order to `Shipped` or `Delivered`.
#[instrument(skip(state, seller, body), fields(order_id = %id, status = ?body.status))]
pub async fn fulfil(
    State(state): State<AppState>,
    seller: RequireSeller,
    Path(id): Path<OrderId>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = state
        .auth()
        .fulfil_order(&seller.seller_id, &id, body.status)
        .await?;
    add_breadcrumb("order", "Order fulfilment updated", &[("order_id", id.as_str())]);
    info!(status = %order.status, "Order status updated by seller");
    Ok(Json(order))
}
