//! Product listing copy from a photo.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::schema::{array, object, string};
use crate::ai::{DataUri, Flow, GenerationError, GenerationModel, require_media, require_output, run_flow};

/// Photo of the product plus optional hints about its heritage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListingInput {
    /// `data:image/...;base64,...`
    pub product_image: String,
    #[serde(default)]
    pub cultural_context_prompt: Option<String>,
}

/// Generated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub title: String,
    pub description: String,
    pub hashtags: Vec<String>,
    pub cultural_context: String,
}

pub struct GenerateProductListing;

impl Flow for GenerateProductListing {
    const NAME: &'static str = "generate_product_listing";
    type Input = ProductListingInput;
    type Output = ProductListing;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        let image = require_media("productImage", &input.product_image)?;
        if !image.is_image() {
            return Err(GenerationError::InvalidInput("productImage must be an image.".into()));
        }
        Ok(())
    }

    fn media(input: &Self::Input) -> Result<Option<DataUri>, GenerationError> {
        require_media("productImage", &input.product_image).map(Some)
    }

    fn prompt(input: &Self::Input) -> String {
        let mut prompt = String::from(
            "You write product listings for KalaConnect, a marketplace for culturally rooted products from India.\n\n\
             From the attached product photo, write:\n\
             1. title: short and catchy, naming the key feature and its cultural relevance.\n\
             2. description: materials, craftsmanship, benefits and cultural significance, naming any festivals, traditions or regions it belongs to.\n\
             3. hashtags: tags for the product category, cultural themes, festivals and current trends, each starting with #.\n\
             4. culturalContext: the product's background, its place in Indian life and the stories or traditions around it.\n\n\
             Keep the copy suitable for a wide audience and true to Indian cultural sensibilities.\n",
        );
        if let Some(hint) = input.cultural_context_prompt.as_deref().filter(|h| !h.trim().is_empty()) {
            prompt.push_str("\nCultural context from the seller: ");
            prompt.push_str(hint.trim());
            prompt.push('\n');
        }
        prompt
    }

    fn output_schema() -> Value {
        object(&[
            ("title", string("Listing title")),
            ("description", string("Listing description")),
            ("hashtags", array("Hashtags", string("A hashtag starting with #"))),
            ("culturalContext", string("Cultural background of the product")),
        ])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_output("title", &output.title)?;
        require_output("description", &output.description)?;
        if output.hashtags.is_empty() {
            return Err("hashtags is empty".into());
        }
        Ok(())
    }
}

/// Draft a listing for a product photo.
///
/// # Errors
///
/// See [`run_flow`].
pub async fn generate_product_listing(
    model: &dyn GenerationModel,
    input: &ProductListingInput,
) -> Result<ProductListing, GenerationError> {
    run_flow::<GenerateProductListing>(model, input).await
}
