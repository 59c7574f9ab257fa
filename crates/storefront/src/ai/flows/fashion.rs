//! Apparel design concepts with a rendered image.
//!
//! Two model calls: a structured concept first, then an image generated from
//! the concept's description.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::ai::schema::{array, object, string};
use crate::ai::{Flow, GenerationError, GenerationModel, require, require_output, run_flow};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FashionDesignInput {
    /// e.g. Wedding, Casual, Festive
    pub occasion: String,
    /// e.g. Modern, Traditional, Fusion
    pub style: String,
    /// e.g. Pastel Pinks, Earthy Tones
    pub color_palette: String,
    #[serde(default)]
    pub user_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignConcept {
    pub design_name: String,
    pub description: String,
    pub fabric_suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FashionDesign {
    #[serde(flatten)]
    pub concept: DesignConcept,
    /// `data:image/...;base64,...`
    pub design_image_uri: String,
}

pub struct GenerateDesignConcept;

impl Flow for GenerateDesignConcept {
    const NAME: &'static str = "generate_fashion_design";
    type Input = FashionDesignInput;
    type Output = DesignConcept;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        require("occasion", &input.occasion)?;
        require("style", &input.style)?;
        require("colorPalette", &input.color_palette)
    }

    fn prompt(input: &Self::Input) -> String {
        let ideas = if input.user_prompt.trim().is_empty() {
            "none"
        } else {
            input.user_prompt.trim()
        };
        format!(
            "You are a fashion designer for KalaConnect, blending traditional Indian craft with \
             contemporary fashion. Design an outfit for:\n\
             - Occasion: {occasion}\n\
             - Style: {style}\n\
             - Colour palette: {palette}\n\
             - Specific ideas: {ideas}\n\n\
             designName: an evocative name for the outfit.\n\
             description: the silhouette, cut and style, and how it uses Indian embroidery, prints \
             or drapes. Make it vivid enough to render as an image.\n\
             fabricSuggestions: suitable fabrics, each with why it works.",
            occasion = input.occasion.trim(),
            style = input.style.trim(),
            palette = input.color_palette.trim(),
        )
    }

    fn output_schema() -> Value {
        object(&[
            ("designName", string("Name of the outfit")),
            ("description", string("Detailed visual description")),
            ("fabricSuggestions", array("Fabrics and why", string("Fabric suggestion"))),
        ])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_output("designName", &output.design_name)?;
        require_output("description", &output.description)
    }
}

/// Prompt for the design render.
#[must_use]
pub fn image_prompt(concept: &DesignConcept, input: &FashionDesignInput) -> String {
    format!(
        "A photorealistic image of a fashion design. {}. The style is {}, for a {} occasion. The color palette is {}.",
        concept.description.trim_end_matches('.'),
        input.style.trim(),
        input.occasion.trim(),
        input.color_palette.trim(),
    )
}

/// Design an outfit and render it.
///
/// # Errors
///
/// Returns `GenerationError::Failed` with "Failed to generate design
/// concept." or "Failed to generate design image." when the model returns
/// nothing usable for that step, and `GenerationError::InvalidInput` or
/// `GenerationError::Backend` as [`run_flow`] does.
#[instrument(skip_all, fields(occasion = %input.occasion, style = %input.style))]
pub async fn generate_fashion_design(
    model: &dyn GenerationModel,
    input: &FashionDesignInput,
) -> Result<FashionDesign, GenerationError> {
    let concept = match run_flow::<GenerateDesignConcept>(model, input).await {
        Ok(concept) => concept,
        Err(
            GenerationError::MissingOutput { .. }
            | GenerationError::Decode { .. }
            | GenerationError::InvalidOutput { .. },
        ) => return Err(GenerationError::Failed("Failed to generate design concept.")),
        Err(e) => return Err(e),
    };

    let image = model
        .generate_image(&image_prompt(&concept, input))
        .await?
        .filter(|image| {
            let usable = image.is_image();
            if !usable {
                warn!(mime = image.mime(), "Design render is not an image");
            }
            usable
        })
        .ok_or(GenerationError::Failed("Failed to generate design image."))?;

    Ok(FashionDesign {
        concept,
        design_image_uri: image.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::{DataUri, StubModel};

    fn input() -> FashionDesignInput {
        FashionDesignInput {
            occasion: "Wedding".into(),
            style: "Fusion".into(),
            color_palette: "Royal Blues".into(),
            user_prompt: String::new(),
        }
    }

    fn concept() -> Value {
        json!({
            "designName": "Neelam Drape",
            "description": "A cape lehenga with zardozi borders.",
            "fabricSuggestions": ["Banarasi silk for structure"]
        })
    }

    #[tokio::test]
    async fn test_design_with_image() {
        let model = StubModel::new()
            .with_json(GenerateDesignConcept::NAME, concept())
            .with_image(DataUri::parse("data:image/png;base64,iVBORw0KGgo=").unwrap());
        let design = generate_fashion_design(&model, &input()).await.unwrap();
        assert_eq!(design.concept.design_name, "Neelam Drape");
        assert!(design.design_image_uri.starts_with("data:image/png;base64,"));

        let body = serde_json::to_value(&design).unwrap();
        assert_eq!(body["designName"], "Neelam Drape");
        assert!(body["designImageUri"].is_string());
    }

    #[tokio::test]
    async fn test_missing_concept() {
        let model = StubModel::new().with_no_output(GenerateDesignConcept::NAME);
        let err = generate_fashion_design(&model, &input()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate design concept.");
    }

    #[tokio::test]
    async fn test_missing_image() {
        let model = StubModel::new().with_json(GenerateDesignConcept::NAME, concept());
        let err = generate_fashion_design(&model, &input()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate design image.");
    }

    #[tokio::test]
    async fn test_non_image_render_is_rejected() {
        let model = StubModel::new()
            .with_json(GenerateDesignConcept::NAME, concept())
            .with_image(DataUri::parse("data:audio/wav;base64,UklGRg==").unwrap());
        let err = generate_fashion_design(&model, &input()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate design image.");
    }

    #[test]
    fn test_image_prompt() {
        let concept: DesignConcept = serde_json::from_value(concept()).unwrap();
        assert_eq!(
            image_prompt(&concept, &input()),
            "A photorealistic image of a fashion design. A cape lehenga with zardozi borders. \
             The style is Fusion, for a Wedding occasion. The color palette is Royal Blues."
        );
    }
}
