//! Account, checkout and order history handlers. All require sign-in.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use kala_connect_core::{AuthUser, Order, OrderId, OrderStatus, ShippingAddress, TrackingStep};

use crate::error::{ApiJson, Result, add_breadcrumb, clear_sentry_user};
use crate::middleware::RequireUser;
use crate::services::Checkout;
use crate::state::AppState;
use crate::stores::auth::ProfileUpdate;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// GET /api/account
pub async fn show(RequireUser { user, .. }: RequireUser) -> Json<AuthUser> {
    Json(user)
}

/// PATCH /api/account
pub async fn update(
    State(state): State<AppState>,
    RequireUser { user, .. }: RequireUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<AuthUser>> {
    let user = state.auth().update_user(&user.email, update).await?;
    Ok(Json(user))
}

/// DELETE /api/account
///
/// Deletes the account and signs the visitor out.
pub async fn delete(State(state): State<AppState>, RequireUser { visitor, user }: RequireUser) -> Result<StatusCode> {
    state.auth().delete_account(visitor, &user.email).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/checkout
///
/// Places an order for the visitor's cart and empties it.
#[instrument(skip_all, fields(email = %user.email))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireUser { visitor, user }: RequireUser,
    ApiJson(address): ApiJson<ShippingAddress>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = Checkout::new(state.products(), state.carts(), state.auth())
        .place_order(visitor, &user.email, address)
        .await?;
    add_breadcrumb("checkout", "Order placed", &[("order_id", order.id.as_str())]);
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
///
/// Newest first.
pub async fn orders(RequireUser { user, .. }: RequireUser) -> Json<Vec<Order>> {
    Json(user.orders)
}

/// GET /api/orders/{id}
pub async fn order(
    State(state): State<AppState>,
    RequireUser { user, .. }: RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.auth().order(&user.email, &id).await?))
}

/// GET /api/orders/{id}/tracking
pub async fn tracking(
    State(state): State<AppState>,
    RequireUser { user, .. }: RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<TrackingStep>>> {
    let order = state.auth().order(&user.email, &id).await?;
    Ok(Json(order.tracking_steps()))
}

/// POST /api/orders/{id}/status
///
/// A buyer may cancel a processing order or return a delivered one. Shipping
/// and delivery are set from the seller dashboard.
pub async fn update_status(
    State(state): State<AppState>,
    RequireUser { user, .. }: RequireUser,
    Path(id): Path<OrderId>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = state
        .auth()
        .update_order_status(&user.email, &id, body.status)
        .await?;
    Ok(Json(order))
}
