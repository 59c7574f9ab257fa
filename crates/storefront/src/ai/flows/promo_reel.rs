//! Script and caption for a short promotional reel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::schema::{object, string};
use crate::ai::{DataUri, Flow, GenerationError, GenerationModel, require, require_media, require_output, run_flow};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoReelInput {
    /// `data:image/...;base64,...`
    pub product_image: String,
    pub product_name: String,
    pub product_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoReel {
    pub caption: String,
    pub script: String,
}

pub struct GeneratePromoReel;

impl Flow for GeneratePromoReel {
    const NAME: &'static str = "generate_promo_reel";
    type Input = PromoReelInput;
    type Output = PromoReel;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        require("productName", &input.product_name)?;
        require("productDescription", &input.product_description)?;
        require_media("productImage", &input.product_image).map(drop)
    }

    fn media(input: &Self::Input) -> Result<Option<DataUri>, GenerationError> {
        require_media("productImage", &input.product_image).map(Some)
    }

    fn prompt(input: &Self::Input) -> String {
        format!(
            "You are a social media marketer for KalaConnect, a marketplace for Indian handicrafts. \
             Plan a 5-10 second promotional reel for this product (photo attached).\n\n\
             Product: {name}\n\
             Description: {description}\n\n\
             script: a few scenes, each written as a scene direction in parentheses followed by a \
             line of on-screen text, for example:\n\
             (Scene: Slow zoom across the glaze)\nText: Shaped by hand.\n\
             caption: a short caption with a call to action and popular, relevant hashtags.",
            name = input.product_name.trim(),
            description = input.product_description.trim(),
        )
    }

    fn output_schema() -> Value {
        object(&[
            ("script", string("Scene directions with on-screen text")),
            ("caption", string("Reel caption with call to action and hashtags")),
        ])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_output("script", &output.script)?;
        require_output("caption", &output.caption)
    }
}

/// Plan a promotional reel.
///
/// # Errors
///
/// See [`run_flow`].
pub async fn generate_promo_reel(model: &dyn GenerationModel, input: &PromoReelInput) -> Result<PromoReel, GenerationError> {
    run_flow::<GeneratePromoReel>(model, input).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::StubModel;

    fn input() -> PromoReelInput {
        PromoReelInput {
            product_image: "data:image/png;base64,iVBORw0KGgo=".into(),
            product_name: "Blue Pottery Vase".into(),
            product_description: "Jaipur blue pottery".into(),
        }
    }

    #[tokio::test]
    async fn test_promo_reel() {
        let model = StubModel::new().with_json(
            GeneratePromoReel::NAME,
            json!({"script": "(Scene: zoom)\nText: Handmade.", "caption": "Shop now #BluePottery"}),
        );
        let reel = generate_promo_reel(&model, &input()).await.unwrap();
        assert!(reel.script.starts_with("(Scene"));
    }

    #[tokio::test]
    async fn test_missing_output_is_an_error() {
        let model = StubModel::new().with_no_output(GeneratePromoReel::NAME);
        let err = generate_promo_reel(&model, &input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingOutput { .. }));
    }

    #[tokio::test]
    async fn test_image_must_be_a_data_uri() {
        let mut bad = input();
        bad.product_image = "https://example.com/vase.png".into();
        let err = generate_promo_reel(&StubModel::new(), &bad).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }
}
