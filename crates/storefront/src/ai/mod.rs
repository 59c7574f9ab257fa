//! Content generation for sellers and shoppers.
//!
//! A [`Flow`] is one structured prompt: validated input in, validated typed
//! output back. [`run_flow`] renders the prompt, sends it with the flow's
//! response schema to a [`GenerationModel`] exactly once, and decodes the JSON
//! the model returns. There is no retry or caching.
//!
//! # Modules
//!
//! - [`gemini`] - The hosted model client
//! - [`flows`] - The ten marketing and shopping flows
//! - [`stub`] - A scripted model for tests and offline runs

pub mod audio;
pub mod data_uri;
pub mod flows;
pub mod gemini;
pub mod schema;
pub mod stub;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use data_uri::{DataUri, DataUriError};
pub use gemini::{GeminiClient, GeminiError};
pub use stub::StubModel;

/// A structured generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Name of the flow issuing the request.
    pub flow: &'static str,
    /// Rendered prompt text.
    pub prompt: String,
    /// Optional inline media sent alongside the prompt.
    pub media: Option<DataUri>,
    /// Schema the JSON response must follow.
    pub schema: Value,
}

/// A hosted generative model.
#[async_trait]
pub trait GenerationModel: Send + Sync {
    /// Generate a JSON value following `request.schema`.
    ///
    /// Returns `None` when the model produced no output.
    async fn generate_json(&self, request: GenerationRequest) -> Result<Option<Value>, GenerationError>;

    /// Generate an image. Returns `None` when the model produced no image.
    async fn generate_image(&self, prompt: &str) -> Result<Option<DataUri>, GenerationError>;

    /// Read `text` aloud. Returns `None` when the model produced no audio.
    async fn synthesize_speech(&self, text: &str) -> Result<Option<DataUri>, GenerationError>;
}

/// Errors from generation flows.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The flow input failed validation.
    #[error("{0}")]
    InvalidInput(String),

    /// Sentiment analysis was asked for products with no reviews.
    #[error("No reviews available to analyze.")]
    NoReviews,

    /// The model backend failed.
    #[error("model backend error: {0}")]
    Backend(#[from] GeminiError),

    /// A multi-step flow could not produce one of its parts.
    #[error("{0}")]
    Failed(&'static str),

    /// The model returned nothing.
    #[error("{flow} produced no output")]
    MissingOutput { flow: &'static str },

    /// The model output did not match the flow's output type.
    #[error("{flow} returned malformed output: {source}")]
    Decode {
        flow: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The model output decoded but broke an output rule.
    #[error("{flow} returned invalid output: {reason}")]
    InvalidOutput { flow: &'static str, reason: String },
}

impl GenerationError {
    /// Whether the caller sent bad input, as opposed to the model failing.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NoReviews)
    }
}

/// One structured prompt.
pub trait Flow {
    /// Flow name, used in logs and errors.
    const NAME: &'static str;

    /// Input accepted by the flow.
    type Input: Sync;

    /// Output decoded from the model response.
    type Output: DeserializeOwned;

    /// Check required input fields.
    fn validate(_input: &Self::Input) -> Result<(), GenerationError> {
        Ok(())
    }

    /// Media sent with the prompt.
    fn media(_input: &Self::Input) -> Result<Option<DataUri>, GenerationError> {
        Ok(None)
    }

    /// Render the prompt.
    fn prompt(input: &Self::Input) -> String;

    /// Response schema handed to the model.
    fn output_schema() -> Value;

    /// Check output rules beyond the shape.
    fn check_output(_output: &Self::Output) -> Result<(), String> {
        Ok(())
    }
}

/// Run `F` once against `model`.
///
/// # Errors
///
/// Returns `GenerationError::InvalidInput` before calling the model, and
/// `Backend`, `MissingOutput`, `Decode` or `InvalidOutput` when the model
/// call or its response is unusable.
#[instrument(skip_all, fields(flow = F::NAME))]
pub async fn run_flow<F: Flow>(model: &dyn GenerationModel, input: &F::Input) -> Result<F::Output, GenerationError> {
    F::validate(input)?;
    let request = GenerationRequest {
        flow: F::NAME,
        prompt: F::prompt(input),
        media: F::media(input)?,
        schema: F::output_schema(),
    };
    debug!(prompt_len = request.prompt.len(), has_media = request.media.is_some(), "Calling model");

    let value = model
        .generate_json(request)
        .await?
        .ok_or(GenerationError::MissingOutput { flow: F::NAME })?;

    let output: F::Output = serde_json::from_value(value).map_err(|source| {
        warn!(error = %source, "Model output did not decode");
        GenerationError::Decode { flow: F::NAME, source }
    })?;

    F::check_output(&output).map_err(|reason| GenerationError::InvalidOutput { flow: F::NAME, reason })?;
    Ok(output)
}

/// Reject a blank required input field.
pub(crate) fn require(field: &str, value: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::InvalidInput(format!("{field} is required.")));
    }
    Ok(())
}

/// Parse a required media field.
pub(crate) fn require_media(field: &str, value: &str) -> Result<DataUri, GenerationError> {
    DataUri::parse(value).map_err(|e| GenerationError::InvalidInput(format!("{field}: {e}")))
}

/// Reject a blank required output field.
pub(crate) fn require_output(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is empty"));
    }
    Ok(())
}
