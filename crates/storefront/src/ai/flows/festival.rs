//! Festival sales forecast and product ideas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use kala_connect_core::Product;

use crate::ai::schema::{array, number, object, string};
use crate::ai::{Flow, GenerationError, GenerationModel, require, require_output, run_flow};

/// A catalog product as described to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            tags: product.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalForecastInput {
    pub festival_name: String,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductIdea {
    pub name: String,
    pub description: String,
    /// e.g. `₹150-200`
    pub estimated_cost_to_make: String,
    pub required_materials: Vec<String>,
    /// e.g. `3-4 hours`
    pub production_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryForecast {
    pub category: String,
    /// Predicted percentage increase.
    pub sales_boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalForecast {
    pub forecast_summary: String,
    pub top_product_suggestions: Vec<String>,
    pub marketing_ideas: Vec<String>,
    pub new_product_ideas: Vec<NewProductIdea>,
    pub category_sales_forecast: Vec<CategoryForecast>,
}

pub struct GenerateFestivalForecast;

impl Flow for GenerateFestivalForecast {
    const NAME: &'static str = "generate_festival_forecast";
    type Input = FestivalForecastInput;
    type Output = FestivalForecast;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        require("festivalName", &input.festival_name)?;
        if input.products.is_empty() {
            return Err(GenerationError::InvalidInput("No products to forecast for.".into()));
        }
        Ok(())
    }

    fn prompt(input: &Self::Input) -> String {
        let festival = input.festival_name.trim();
        let products = serde_json::to_string_pretty(&input.products).unwrap_or_default();
        format!(
            "You are an e-commerce strategist for KalaConnect, a marketplace for Indian handicrafts \
             and cultural products. Advise a seller ahead of {festival}.\n\n\
             Seller's products:\n{products}\n\n\
             Provide:\n\
             1. forecastSummary: what shoppers look for around {festival} and the general mood.\n\
             2. topProductSuggestions: the seller's products that fit {festival} best, one sentence of reasoning each.\n\
             3. marketingIdeas: slogans or campaign ideas tying the products to {festival}.\n\
             4. newProductIdeas: 2-3 new products in the seller's craft style, each with a name, \
             description, estimatedCostToMake (e.g. \"₹150-200\"), requiredMaterials and \
             productionTime per unit (e.g. \"3-4 hours\").\n\
             5. categorySalesForecast: for each category found in the product tags, the expected \
             salesBoost as a plain percentage number."
        )
    }

    fn output_schema() -> Value {
        let idea = object(&[
            ("name", string("Product name")),
            ("description", string("Why it suits the festival")),
            ("estimatedCostToMake", string("Cost range per unit")),
            ("requiredMaterials", array("Raw materials", string("Material"))),
            ("productionTime", string("Time per unit")),
        ]);
        let category = object(&[
            ("category", string("Product category")),
            ("salesBoost", number("Predicted percentage increase")),
        ]);
        object(&[
            ("forecastSummary", string("Festival shopping trends")),
            ("topProductSuggestions", array("Best-fit existing products", string("Suggestion"))),
            ("marketingIdeas", array("Campaign ideas", string("Idea"))),
            ("newProductIdeas", array("New product ideas", idea)),
            ("categorySalesForecast", array("Sales boost per category", category)),
        ])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_output("forecastSummary", &output.forecast_summary)
    }
}

/// Forecast `festival` for `products`.
///
/// # Errors
///
/// See [`run_flow`].
pub async fn generate_festival_forecast(
    model: &dyn GenerationModel,
    festival: &str,
    products: &[Product],
) -> Result<FestivalForecast, GenerationError> {
    let input = FestivalForecastInput {
        festival_name: festival.to_owned(),
        products: products.iter().map(ProductSummary::from).collect(),
    };
    run_flow::<GenerateFestivalForecast>(model, &input).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::StubModel;
    use crate::fixtures;

    #[tokio::test]
    async fn test_forecast() {
        let model = StubModel::new().with_json(
            GenerateFestivalForecast::NAME,
            json!({
                "forecastSummary": "Diwali drives home decor gifting.",
                "topProductSuggestions": ["Blue Pottery Vase: a classic gift"],
                "marketingIdeas": ["Light up every corner"],
                "newProductIdeas": [{
                    "name": "Painted Diya Set",
                    "description": "Six clay diyas",
                    "estimatedCostToMake": "₹150-200",
                    "requiredMaterials": ["clay", "paint"],
                    "productionTime": "3-4 hours"
                }],
                "categorySalesForecast": [{"category": "home-decor", "salesBoost": 75}]
            }),
        );
        let forecast = generate_festival_forecast(&model, "Diwali", &fixtures::products())
            .await
            .unwrap();
        assert_eq!(forecast.new_product_ideas[0].required_materials.len(), 2);
        assert!((forecast.category_sales_forecast[0].sales_boost - 75.0).abs() < f64::EPSILON);
        assert!(model.requests()[0].prompt.contains("Diwali"));
    }

    #[tokio::test]
    async fn test_festival_is_required() {
        let err = generate_festival_forecast(&StubModel::new(), " ", &fixtures::products())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_bad_idea_shape() {
        let model = StubModel::new().with_json(
            GenerateFestivalForecast::NAME,
            json!({
                "forecastSummary": "x",
                "topProductSuggestions": [],
                "marketingIdeas": [],
                "newProductIdeas": [{"name": "only a name"}],
                "categorySalesForecast": []
            }),
        );
        let err = generate_festival_forecast(&model, "Holi", &fixtures::products())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Decode { .. }));
    }
}
