//! Restock and catalog advice from stock and sales.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use kala_connect_core::{Price, Product, ProductSale};

use crate::ai::schema::{array, object, string};
use crate::ai::{Flow, GenerationError, GenerationModel, run_flow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryProduct {
    pub name: String,
    pub stock: u32,
    pub price: Price,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sales: Vec<ProductSale>,
}

impl From<&Product> for InventoryProduct {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            stock: product.stock,
            price: product.price,
            tags: product.tags.clone(),
            sales: product.sales.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryInput {
    pub products: Vec<InventoryProduct>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAdvice {
    pub restock_suggestions: Vec<String>,
    pub slow_movers: Vec<String>,
    pub new_product_ideas: Vec<String>,
}

pub struct GenerateInventoryAdvice;

impl Flow for GenerateInventoryAdvice {
    const NAME: &'static str = "generate_inventory_advice";
    type Input = InventoryInput;
    type Output = InventoryAdvice;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        if input.products.is_empty() {
            return Err(GenerationError::InvalidInput("No products to analyze.".into()));
        }
        Ok(())
    }

    fn prompt(input: &Self::Input) -> String {
        let products = serde_json::to_string_pretty(&input.products).unwrap_or_default();
        format!(
            "You are an inventory analyst for KalaConnect, a marketplace for Indian handicrafts. \
             Each product below has its current stock and monthly sales.\n\n\
             {products}\n\n\
             Identify:\n\
             1. restockSuggestions: products selling well with less than about two months of stock left.\n\
             2. slowMovers: products with low average monthly sales and high stock.\n\
             3. newProductIdeas: 2-3 specific new products building on the most popular tags and themes.\n\
             Keep every entry short and actionable."
        )
    }

    fn output_schema() -> Value {
        object(&[
            ("restockSuggestions", array("Products to restock", string("Suggestion"))),
            ("slowMovers", array("Products selling poorly", string("Product"))),
            ("newProductIdeas", array("New product ideas", string("Idea"))),
        ])
    }
}

/// Advise on stock levels for `products`.
///
/// # Errors
///
/// See [`run_flow`].
pub async fn generate_inventory_advice(
    model: &dyn GenerationModel,
    products: &[Product],
) -> Result<InventoryAdvice, GenerationError> {
    let input = InventoryInput {
        products: products.iter().map(InventoryProduct::from).collect(),
    };
    run_flow::<GenerateInventoryAdvice>(model, &input).await
}
