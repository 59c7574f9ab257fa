//! Interface language preference.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{ApiJson, Result};
use crate::middleware::Visitor;
use crate::state::AppState;
use crate::stores::SUPPORTED_LOCALES;

#[derive(Debug, Serialize)]
pub struct LocaleView {
    pub locale: &'static str,
    pub supported: &'static [&'static str],
}

impl LocaleView {
    const fn new(locale: &'static str) -> Self {
        Self {
            locale,
            supported: &SUPPORTED_LOCALES,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetLocale {
    pub locale: String,
}

/// GET /api/locale
pub async fn show(State(state): State<AppState>, Visitor(visitor): Visitor) -> Json<LocaleView> {
    Json(LocaleView::new(state.locales().get(visitor).await))
}

/// PUT /api/locale
pub async fn update(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    ApiJson(body): ApiJson<SetLocale>,
) -> Result<Json<LocaleView>> {
    let locale = state.locales().set(visitor, &body.locale).await?;
    Ok(Json(LocaleView::new(locale)))
}
