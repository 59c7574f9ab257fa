//! Run one generation flow from the command line.
//!
//! The input file holds the flow's JSON input, in the same shape the
//! `/api/ai/*` endpoints accept. Dashboard flows take an optional `products`
//! array and fall back to the dashboard seller's fixture products; product
//! search always searches the fixture catalog.

use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use kala_connect_core::{Product, SellerId};
use kala_connect_storefront::ai::flows::{self, AssistantReply};
use kala_connect_storefront::ai::{GeminiClient, GenerationModel};
use kala_connect_storefront::config::GeminiConfig;
use kala_connect_storefront::fixtures;

use super::CommandError;

/// Flows runnable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlowName {
    ProductListing,
    ReelCaption,
    PromoReel,
    SellerStory,
    ReviewSentiment,
    FestivalForecast,
    InventoryAdvice,
    FashionDesign,
    ProductSearch,
    Speech,
}

#[derive(Debug, Default, Deserialize)]
struct DashboardInput {
    #[serde(default)]
    products: Option<Vec<Product>>,
}

impl DashboardInput {
    fn products(self) -> Vec<Product> {
        self.products.unwrap_or_else(|| {
            let seller = SellerId::new(fixtures::DASHBOARD_SELLER_ID);
            fixtures::products()
                .into_iter()
                .filter(|p| p.seller_id == seller)
                .collect()
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FestivalInput {
    festival_name: String,
    #[serde(flatten)]
    dashboard: DashboardInput,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
    #[serde(default)]
    voice: bool,
}

/// Run `flow` on the input in `path` and print the result.
///
/// # Errors
///
/// Returns `CommandError` if the input cannot be read or parsed, Gemini is
/// not configured, or the flow fails.
pub async fn run(flow: FlowName, path: &Path) -> Result<(), CommandError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|source| CommandError::Input {
        path: path.display().to_string(),
        source,
    })?;
    let input: Value = serde_json::from_str(&raw)?;

    let client = GeminiClient::new(&GeminiConfig::from_env()?)?;
    info!(?flow, "Running flow");
    let output = execute(&client, flow, input).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&output).map_err(CommandError::Output)?);
    }
    Ok(())
}

fn parse<T: DeserializeOwned>(input: Value) -> Result<T, CommandError> {
    Ok(serde_json::from_value(input)?)
}

/// Run `flow` against `model` and return its output as JSON.
async fn execute(model: &dyn GenerationModel, flow: FlowName, input: Value) -> Result<Value, CommandError> {
    let output = match flow {
        FlowName::ProductListing => {
            serde_json::to_value(flows::generate_product_listing(model, &parse(input)?).await?)
        }
        FlowName::ReelCaption => serde_json::to_value(flows::generate_reel_caption(model, &parse(input)?).await?),
        FlowName::PromoReel => serde_json::to_value(flows::generate_promo_reel(model, &parse(input)?).await?),
        FlowName::SellerStory => serde_json::to_value(flows::expand_seller_story(model, &parse(input)?).await?),
        FlowName::ReviewSentiment => {
            let products = parse::<DashboardInput>(input)?.products();
            serde_json::to_value(flows::analyze_review_sentiment(model, &products).await?)
        }
        FlowName::FestivalForecast => {
            let festival: FestivalInput = parse(input)?;
            let products = festival.dashboard.products();
            serde_json::to_value(flows::generate_festival_forecast(model, &festival.festival_name, &products).await?)
        }
        FlowName::InventoryAdvice => {
            let products = parse::<DashboardInput>(input)?.products();
            serde_json::to_value(flows::generate_inventory_advice(model, &products).await?)
        }
        FlowName::FashionDesign => {
            serde_json::to_value(flows::generate_fashion_design(model, &parse(input)?).await?)
        }
        FlowName::ProductSearch => {
            let search: SearchInput = parse(input)?;
            let catalog = fixtures::products();
            let reply = if search.voice {
                flows::answer_shopper(model, &search.query, &catalog).await?
            } else {
                AssistantReply {
                    result: flows::conversational_product_search(model, &search.query, &catalog).await?,
                    audio: None,
                }
            };
            serde_json::to_value(reply)
        }
        FlowName::Speech => {
            let speech: flows::SpeechInput = parse(input)?;
            serde_json::to_value(flows::text_to_speech(model, &speech.text).await?)
        }
    }
    .map_err(CommandError::Output)?;
    Ok(output)
}
