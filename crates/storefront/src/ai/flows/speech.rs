//! Text to speech.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::ai::{GenerationError, GenerationModel, require};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechOutput {
    /// `data:audio/wav;base64,...`
    pub media: String,
}

/// Read `text` aloud.
///
/// # Errors
///
/// Returns `GenerationError::InvalidInput` for blank text,
/// `GenerationError::Failed` when the model returns no audio, and
/// `GenerationError::Backend` when the call fails.
#[instrument(skip_all, fields(chars = text.len()))]
pub async fn text_to_speech(model: &dyn GenerationModel, text: &str) -> Result<SpeechOutput, GenerationError> {
    require("text", text)?;
    let audio = model
        .synthesize_speech(text)
        .await?
        .ok_or(GenerationError::Failed("Failed to generate speech."))?;
    Ok(SpeechOutput {
        media: audio.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ai::{DataUri, StubModel};

    #[tokio::test]
    async fn test_speech() {
        let model = StubModel::new().with_speech(DataUri::from_bytes("audio/wav", b"RIFF"));
        let output = text_to_speech(&model, "Namaste").await.unwrap();
        assert_eq!(output.media, "data:audio/wav;base64,UklGRg==");
    }

    #[tokio::test]
    async fn test_no_audio() {
        let err = text_to_speech(&StubModel::new(), "Namaste").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate speech.");
    }

    #[tokio::test]
    async fn test_blank_text() {
        let err = text_to_speech(&StubModel::new(), "  ").await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }
}
