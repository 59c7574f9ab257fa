//! Conversational product search and the spoken shopping assistant.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use kala_connect_core::{Price, Product, ProductId};

use super::speech::text_to_speech;
use crate::ai::schema::{array, object, string};
use crate::ai::{Flow, GenerationError, GenerationModel, require, require_output, run_flow};

/// A catalog product as shown to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Product> for CatalogEntry {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            tags: product.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInput {
    pub query: String,
    pub catalog: Vec<CatalogEntry>,
}

/// A product the model picked. Only the id is trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductMatch {
    pub id: ProductId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchReply {
    pub response: String,
    #[serde(default)]
    pub products: Vec<ProductMatch>,
}

/// Search answer with products resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub response: String,
    pub products: Vec<Product>,
}

/// Search answer plus the reply read aloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(flatten)]
    pub result: SearchResult,
    /// WAV data URI, absent when speech failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

pub struct ConversationalProductSearch;

impl Flow for ConversationalProductSearch {
    const NAME: &'static str = "conversational_product_search";
    type Input = SearchInput;
    type Output = SearchReply;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        require("query", &input.query)
    }

    fn prompt(input: &Self::Input) -> String {
        let catalog = serde_json::to_string_pretty(&input.catalog).unwrap_or_default();
        format!(
            "You are the shopping assistant of KalaConnect, an Indian e-commerce store. Help the \
             shopper find products from this catalog:\n{catalog}\n\n\
             Shopper: {query}\n\n\
             response: a friendly, conversational reply that mentions the products you picked.\n\
             products: the id and name of every matching catalog product, or an empty list when \
             nothing matches. Only use ids from the catalog.",
            query = input.query.trim(),
        )
    }

    fn output_schema() -> Value {
        object(&[
            ("response", string("Conversational reply")),
            (
                "products",
                array(
                    "Matching catalog products",
                    object(&[("id", string("Catalog product id")), ("name", string("Product name"))]),
                ),
            ),
        ])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_output("response", &output.response)
    }
}

/// Answer `query` from `catalog`.
///
/// Products named by the model are looked up in `catalog` by id, so only
/// real, current listings are returned; unknown ids are dropped.
///
/// # Errors
///
/// See [`run_flow`].
pub async fn conversational_product_search(
    model: &dyn GenerationModel,
    query: &str,
    catalog: &[Product],
) -> Result<SearchResult, GenerationError> {
    let input = SearchInput {
        query: query.to_owned(),
        catalog: catalog.iter().map(CatalogEntry::from).collect(),
    };
    let reply = run_flow::<ConversationalProductSearch>(model, &input).await?;

    let mut seen = HashSet::new();
    let products = reply
        .products
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .filter_map(|m| {
            let found = catalog.iter().find(|p| p.id == m.id).cloned();
            if found.is_none() {
                debug!(product_id = %m.id, "Model named a product not in the catalog");
            }
            found
        })
        .collect();

    Ok(SearchResult {
        response: reply.response,
        products,
    })
}

/// Search, then read the reply aloud.
///
/// A speech failure is logged and leaves `audio` empty; it never fails the search.
///
/// # Errors
///
/// Same as [`conversational_product_search`].
#[instrument(skip(model, catalog))]
pub async fn answer_shopper(
    model: &dyn GenerationModel,
    query: &str,
    catalog: &[Product],
) -> Result<AssistantReply, GenerationError> {
    let result = conversational_product_search(model, query, catalog).await?;
    let audio = match text_to_speech(model, &result.response).await {
        Ok(speech) => Some(speech.media),
        Err(e) => {
            warn!(error = %e, "Speech synthesis failed, replying with text only");
            None
        }
    };
    Ok(AssistantReply { result, audio })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::{DataUri, StubModel};
    use crate::fixtures;

    fn reply() -> Value {
        json!({
            "response": "You might like these!",
            "products": [
                {"id": "prod-1", "name": "whatever the model says"},
                {"id": "prod-1", "name": "duplicate"},
                {"id": "prod-404", "name": "invented"}
            ]
        })
    }

    #[tokio::test]
    async fn test_products_are_resolved_against_catalog() {
        let model = StubModel::new().with_json(ConversationalProductSearch::NAME, reply());
        let catalog = fixtures::products();
        let result = conversational_product_search(&model, "home decor", &catalog).await.unwrap();

        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0], catalog[0]);
    }

    #[tokio::test]
    async fn test_assistant_attaches_audio() {
        let model = StubModel::new()
            .with_json(ConversationalProductSearch::NAME, reply())
            .with_speech(DataUri::from_bytes("audio/wav", b"RIFF"));
        let answer = answer_shopper(&model, "gifts", &fixtures::products()).await.unwrap();
        assert!(answer.audio.unwrap().starts_with("data:audio/wav;base64,"));
    }

    #[tokio::test]
    async fn test_speech_failure_does_not_fail_search() {
        let model = StubModel::new()
            .with_json(ConversationalProductSearch::NAME, reply())
            .with_failing_speech();
        let answer = answer_shopper(&model, "gifts", &fixtures::products()).await.unwrap();
        assert!(answer.audio.is_none());
        assert_eq!(answer.result.response, "You might like these!");
    }

    #[tokio::test]
    async fn test_missing_response_text() {
        let model = StubModel::new().with_json(ConversationalProductSearch::NAME, json!({"products": []}));
        let err = conversational_product_search(&model, "x", &fixtures::products())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Decode { .. }));
    }
}
