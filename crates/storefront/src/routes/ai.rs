//! Content generation handlers.
//!
//! Each endpoint runs one flow. Dashboard analyses (sentiment, festival
//! forecast, inventory) read the signed-in seller's own products.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::ai::flows::{
    self, AssistantReply, FashionDesign, FashionDesignInput, FestivalForecast, InventoryAdvice, ProductListing,
    ProductListingInput, PromoReel, PromoReelInput, ReelCaption, ReelCaptionInput, ReviewSentiment, SellerStory,
    SellerStoryInput, SpeechInput, SpeechOutput,
};
use crate::error::{ApiJson, Result};
use crate::middleware::RequireSeller;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalRequest {
    pub festival_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Also read the reply aloud.
    #[serde(default)]
    pub voice: bool,
}

/// POST /api/ai/product-listing
pub async fn product_listing(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductListingInput>,
) -> Result<Json<ProductListing>> {
    Ok(Json(flows::generate_product_listing(state.model(), &input).await?))
}

/// POST /api/ai/reel-caption
pub async fn reel_caption(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ReelCaptionInput>,
) -> Result<Json<ReelCaption>> {
    Ok(Json(flows::generate_reel_caption(state.model(), &input).await?))
}

/// POST /api/ai/promo-reel
pub async fn promo_reel(State(state): State<AppState>, ApiJson(input): ApiJson<PromoReelInput>) -> Result<Json<PromoReel>> {
    Ok(Json(flows::generate_promo_reel(state.model(), &input).await?))
}

/// POST /api/ai/seller-story
pub async fn seller_story(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SellerStoryInput>,
) -> Result<Json<SellerStory>> {
    Ok(Json(flows::expand_seller_story(state.model(), &input).await?))
}

/// POST /api/ai/review-sentiment
pub async fn review_sentiment(State(state): State<AppState>, seller: RequireSeller) -> Result<Json<ReviewSentiment>> {
    let products = state.products().by_seller(&seller.seller_id).await;
    Ok(Json(flows::analyze_review_sentiment(state.model(), &products).await?))
}

/// POST /api/ai/festival-forecast
pub async fn festival_forecast(
    State(state): State<AppState>,
    seller: RequireSeller,
    ApiJson(body): ApiJson<FestivalRequest>,
) -> Result<Json<FestivalForecast>> {
    let products = state.products().by_seller(&seller.seller_id).await;
    let forecast = flows::generate_festival_forecast(state.model(), &body.festival_name, &products).await?;
    Ok(Json(forecast))
}

/// POST /api/ai/inventory-advice
pub async fn inventory_advice(State(state): State<AppState>, seller: RequireSeller) -> Result<Json<InventoryAdvice>> {
    let products = state.products().by_seller(&seller.seller_id).await;
    Ok(Json(flows::generate_inventory_advice(state.model(), &products).await?))
}

/// POST /api/ai/fashion-design
pub async fn fashion_design(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FashionDesignInput>,
) -> Result<Json<FashionDesign>> {
    Ok(Json(flows::generate_fashion_design(state.model(), &input).await?))
}

/// POST /api/ai/product-search
///
/// Searches the whole catalog. With `voice`, the reply also carries audio.
pub async fn product_search(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SearchRequest>,
) -> Result<Json<AssistantReply>> {
    let catalog = state.products().list().await;
    let reply = if body.voice {
        flows::answer_shopper(state.model(), &body.query, &catalog).await?
    } else {
        let result = flows::conversational_product_search(state.model(), &body.query, &catalog).await?;
        AssistantReply { result, audio: None }
    };
    Ok(Json(reply))
}

/// POST /api/ai/speech
pub async fn speech(State(state): State<AppState>, ApiJson(input): ApiJson<SpeechInput>) -> Result<Json<SpeechOutput>> {
    Ok(Json(flows::text_to_speech(state.model(), &input.text).await?))
}
