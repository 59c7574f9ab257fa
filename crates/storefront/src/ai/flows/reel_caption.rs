//! Captions for shoppable reels.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::schema::{object, string};
use crate::ai::{Flow, GenerationError, GenerationModel, require, require_output, run_flow};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelCaptionInput {
    pub product_description: String,
    pub video_content_summary: String,
    pub brand_name: String,
    #[serde(default)]
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelCaption {
    pub caption: String,
}

pub struct GenerateReelCaption;

impl Flow for GenerateReelCaption {
    const NAME: &'static str = "generate_reel_caption";
    type Input = ReelCaptionInput;
    type Output = ReelCaption;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        require("productDescription", &input.product_description)?;
        require("videoContentSummary", &input.video_content_summary)?;
        require("brandName", &input.brand_name)
    }

    fn prompt(input: &Self::Input) -> String {
        let audience = input
            .target_audience
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or("general shoppers");
        format!(
            "You write captions for shoppable video reels.\n\n\
             Brand: {brand}\n\
             Product: {product}\n\
             What the video shows: {video}\n\
             Audience: {audience}\n\n\
             Write one short, attention-grabbing caption that sends viewers to the featured products. \
             End it with a few relevant hashtags.",
            brand = input.brand_name.trim(),
            product = input.product_description.trim(),
            video = input.video_content_summary.trim(),
        )
    }

    fn output_schema() -> Value {
        object(&[("caption", string("The reel caption, hashtags included"))])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_output("caption", &output.caption)
    }
}

/// Write a reel caption.
///
/// # Errors
///
/// See [`run_flow`].
pub async fn generate_reel_caption(
    model: &dyn GenerationModel,
    input: &ReelCaptionInput,
) -> Result<ReelCaption, GenerationError> {
    run_flow::<GenerateReelCaption>(model, input).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::StubModel;

    fn input() -> ReelCaptionInput {
        ReelCaptionInput {
            product_description: "Indigo block-printed cotton saree".into(),
            video_content_summary: "Artisan stamping the fabric".into(),
            brand_name: "Bagru Prints".into(),
            target_audience: None,
        }
    }

    #[tokio::test]
    async fn test_caption() {
        let model = StubModel::new().with_json(GenerateReelCaption::NAME, json!({"caption": "Printed by hand #Bagru"}));
        let caption = generate_reel_caption(&model, &input()).await.unwrap();
        assert_eq!(caption.caption, "Printed by hand #Bagru");
        assert!(model.requests()[0].prompt.contains("general shoppers"));
    }

    #[tokio::test]
    async fn test_blank_caption_is_invalid() {
        let model = StubModel::new().with_json(GenerateReelCaption::NAME, json!({"caption": "  "}));
        let err = generate_reel_caption(&model, &input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOutput { .. }));
    }

    #[tokio::test]
    async fn test_brand_is_required() {
        let mut bad = input();
        bad.brand_name = String::new();
        let err = generate_reel_caption(&StubModel::new(), &bad).await.unwrap_err();
        assert_eq!(err.to_string(), "brandName is required.");
    }
}
