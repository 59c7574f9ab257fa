//! The generation flows.
//!
//! Seller tools: listing copy, reel captions, promo reels, brand stories,
//! review sentiment, festival forecasts and inventory advice. Shopper tools:
//! fashion design, conversational search and speech.

pub mod fashion;
pub mod festival;
pub mod inventory;
pub mod listing;
pub mod promo_reel;
pub mod reel_caption;
pub mod search;
pub mod seller_story;
pub mod sentiment;
pub mod speech;

pub use fashion::{FashionDesign, FashionDesignInput, generate_fashion_design};
pub use festival::{FestivalForecast, generate_festival_forecast};
pub use inventory::{InventoryAdvice, generate_inventory_advice};
pub use listing::{ProductListing, ProductListingInput, generate_product_listing};
pub use promo_reel::{PromoReel, PromoReelInput, generate_promo_reel};
pub use reel_caption::{ReelCaption, ReelCaptionInput, generate_reel_caption};
pub use search::{AssistantReply, SearchResult, answer_shopper, conversational_product_search};
pub use seller_story::{SellerStory, SellerStoryInput, expand_seller_story};
pub use sentiment::{ReviewSentiment, analyze_review_sentiment};
pub use speech::{SpeechInput, SpeechOutput, text_to_speech};
