//! Shared cart route handlers.
//!
//! Anyone holding the link may view and edit a shared cart. Viewers follow
//! edits live over server-sent events.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{instrument, warn};

use kala_connect_core::{CartItem, CartSummary, ProductId, SharedCartId};

use crate::error::{ApiJson, Result};
use crate::routes::cart::SetQuantity;
use crate::shared_cart::{SharedCartDocument, UpdateOutcome};
use crate::state::AppState;

/// SSE event name carrying a cart document.
pub const CART_EVENT: &str = "cart";

/// A shared cart as served to viewers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCartView {
    pub id: SharedCartId,
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub summary: CartSummary,
    pub created_at: DateTime<Utc>,
}

impl SharedCartView {
    fn new(id: SharedCartId, document: SharedCartDocument) -> Self {
        Self {
            id,
            summary: CartSummary::of(&document.items),
            items: document.items,
            created_at: document.created_at,
        }
    }
}

/// GET /api/shared-carts/{id}
pub async fn show(State(state): State<AppState>, Path(id): Path<SharedCartId>) -> Result<Json<SharedCartView>> {
    let document = state.shared_carts().get(&id).await?;
    Ok(Json(SharedCartView::new(id, document)))
}

/// GET /api/shared-carts/{id}/events
///
/// Sends the current cart, then one `cart` event per committed change.
pub async fn events(
    State(state): State<AppState>,
    Path(id): Path<SharedCartId>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let documents = state.shared_carts().subscribe(&id).await?;
    let stream = documents.filter_map(move |document| {
        let view = SharedCartView::new(id.clone(), document);
        async move {
            match Event::default().event(CART_EVENT).json_data(&view) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!(cart_id = %view.id, error = %e, "Could not encode shared cart event");
                    None
                }
            }
        }
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// PATCH /api/shared-carts/{id}/items/{product}
#[instrument(skip(state, body), fields(cart_id = %id, product_id = %product_id))]
pub async fn update(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(SharedCartId, ProductId)>,
    ApiJson(body): ApiJson<SetQuantity>,
) -> Result<Json<UpdateOutcome>> {
    let outcome = state
        .shared_carts()
        .update_item_quantity(&id, &product_id, body.units())
        .await?;
    Ok(Json(outcome))
}

/// DELETE /api/shared-carts/{id}/items/{product}
pub async fn remove(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(SharedCartId, ProductId)>,
) -> Result<Json<UpdateOutcome>> {
    let outcome = state.shared_carts().remove_item(&id, &product_id).await?;
    Ok(Json(outcome))
}
