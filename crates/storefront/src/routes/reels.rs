//! Reel feed handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use kala_connect_core::{Reel, ReelDraft};

use crate::error::{ApiJson, Result};
use crate::middleware::RequireSeller;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReel {
    #[serde(flatten)]
    pub draft: ReelDraft,
    pub video_url: String,
}

/// GET /api/reels
pub async fn index(State(state): State<AppState>) -> Json<Vec<Reel>> {
    Json(state.reels().list().await)
}

/// POST /api/reels
pub async fn create(
    State(state): State<AppState>,
    seller: RequireSeller,
    ApiJson(body): ApiJson<NewReel>,
) -> Result<(StatusCode, Json<Reel>)> {
    let reel = state
        .reels()
        .add_reel(body.draft, body.video_url, seller.seller_id)
        .await?;
    Ok((StatusCode::CREATED, Json(reel)))
}
