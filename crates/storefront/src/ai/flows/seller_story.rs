//! Brand story expansion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::schema::{object, string};
use crate::ai::{Flow, GenerationError, GenerationModel, require, require_output, run_flow};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStoryInput {
    pub brief_story: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStory {
    pub expanded_story: String,
}

pub struct ExpandSellerStory;

impl Flow for ExpandSellerStory {
    const NAME: &'static str = "expand_seller_story";
    type Input = SellerStoryInput;
    type Output = SellerStory;

    fn validate(input: &Self::Input) -> Result<(), GenerationError> {
        require("briefStory", &input.brief_story)
    }

    fn prompt(input: &Self::Input) -> String {
        format!(
            "You are a storyteller who helps small brands connect with their customers.\n\n\
             Turn this short description of a seller into a full, warm brand story covering where \
             it started, what it values and the place it comes from. Readers should come away \
             trusting the people behind it.\n\n\
             Short description: {}",
            input.brief_story.trim()
        )
    }

    fn output_schema() -> Value {
        object(&[("expandedStory", string("The full brand story"))])
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_output("expandedStory", &output.expanded_story)
    }
}

/// Expand a seller's short description into a brand story.
///
/// # Errors
///
/// See [`run_flow`].
pub async fn expand_seller_story(model: &dyn GenerationModel, input: &SellerStoryInput) -> Result<SellerStory, GenerationError> {
    run_flow::<ExpandSellerStory>(model, input).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::StubModel;

    #[tokio::test]
    async fn test_story_round_trip() {
        let model = StubModel::new().with_json(
            ExpandSellerStory::NAME,
            json!({"expandedStory": "In a village outside Jaipur..."}),
        );
        let story = expand_seller_story(
            &model,
            &SellerStoryInput {
                brief_story: "Three sisters making pottery".into(),
            },
        )
        .await
        .unwrap();
        assert!(story.expanded_story.starts_with("In a village"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_rejected() {
        let model = StubModel::new().with_json(ExpandSellerStory::NAME, json!({"story": "x"}));
        let err = expand_seller_story(
            &model,
            &SellerStoryInput {
                brief_story: "Three sisters".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GenerationError::Decode { .. }));
    }
}
