//! Gemini API client.
//!
//! Every call goes to `models/{model}:generateContent`. Structured output uses
//! JSON mode with a response schema, images use the image model with
//! `TEXT`+`IMAGE` modalities, and speech uses the TTS model, whose raw PCM is
//! wrapped into a WAV data URI.

mod error;
pub mod types;

pub use error::{ApiErrorResponse, GeminiError};

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::GeminiConfig;

use super::audio::{SPEECH_BITS_PER_SAMPLE, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, pcm_to_wav};
use super::{DataUri, GenerationError, GenerationModel, GenerationRequest};
use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, SpeechConfig};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    api_base: String,
    text_model: String,
    image_model: String,
    speech_model: String,
    speech_voice: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::InvalidApiKey` if the key cannot be sent as a
    /// header, or `GeminiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut api_key =
            HeaderValue::from_str(config.api_key.expose_secret()).map_err(|_| GeminiError::InvalidApiKey)?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                api_base: config.api_base.trim_end_matches('/').to_string(),
                text_model: config.text_model.clone(),
                image_model: config.image_model.clone(),
                speech_model: config.speech_model.clone(),
                speech_voice: config.speech_voice.clone(),
            }),
        })
    }

    /// Call `generateContent` on `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API returns an error
    /// response, or the prompt is blocked.
    #[instrument(skip(self, request), fields(model = %model))]
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!("{}/models/{model}:generateContent", self.inner.api_base);
        let response = self.inner.client.post(url).json(request).send().await?;
        let parsed = self.handle_response(response).await?;

        if let Some(reason) = parsed.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
            return Err(GeminiError::Blocked(reason));
        }
        if let Some(usage) = parsed.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }
        Ok(parsed)
    }

    /// Handle a successful response.
    async fn handle_response(&self, response: reqwest::Response) -> Result<GenerateContentResponse, GeminiError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| GeminiError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(&self, status: reqwest::StatusCode, response: reqwest::Response) -> GeminiError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return GeminiError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return GeminiError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_error) => GeminiError::Api {
                    status: api_error.error.status,
                    message: api_error.error.message,
                },
                Err(_) => GeminiError::Api {
                    status: status.to_string(),
                    message: body,
                },
            },
            Err(e) => GeminiError::Http(e),
        }
    }
}

/// Build a JSON-mode request.
fn json_request(request: &GenerationRequest) -> GenerateContentRequest {
    let mut parts = vec![Part::text(request.prompt.clone())];
    if let Some(media) = &request.media {
        parts.push(Part::inline(media.mime(), media.payload()));
    }
    GenerateContentRequest {
        contents: vec![Content::user(parts)],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(request.schema.clone()),
            ..GenerationConfig::default()
        }),
    }
}

/// Sample rate from a PCM media type such as `audio/L16;codec=pcm;rate=24000`.
fn pcm_sample_rate(mime: &str) -> u32 {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
        .unwrap_or(SPEECH_SAMPLE_RATE)
}

#[async_trait]
impl GenerationModel for GeminiClient {
    async fn generate_json(&self, request: GenerationRequest) -> Result<Option<Value>, GenerationError> {
        let body = json_request(&request);
        let response = self.generate_content(&self.inner.text_model, &body).await?;

        let Some(text) = response.text() else {
            return Ok(None);
        };
        let value = serde_json::from_str(&text)
            .map_err(|e| GeminiError::Parse(format!("{} returned non-JSON text: {e}", request.flow)))?;
        Ok(Some(value))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Option<DataUri>, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate_content(&self.inner.image_model, &body).await?;

        response
            .inline_data("image/")
            .map(|data| DataUri::from_base64(&data.mime_type, &data.data))
            .transpose()
            .map_err(|e| GeminiError::Parse(format!("invalid image data: {e}")).into())
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Option<DataUri>, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(text)])],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::voice(self.inner.speech_voice.clone())),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate_content(&self.inner.speech_model, &body).await?;

        let Some(audio) = response.inline_data("audio/") else {
            return Ok(None);
        };
        let pcm = STANDARD
            .decode(&audio.data)
            .map_err(|e| GeminiError::Parse(format!("invalid audio data: {e}")))?;
        let wav = pcm_to_wav(
            &pcm,
            pcm_sample_rate(&audio.mime_type),
            SPEECH_CHANNELS,
            SPEECH_BITS_PER_SAMPLE,
        );
        Ok(Some(DataUri::from_bytes("audio/wav", &wav)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_request_carries_schema_and_media() {
        let request = GenerationRequest {
            flow: "generate_product_listing",
            prompt: "Describe this".into(),
            media: Some(DataUri::parse("data:image/jpeg;base64,AAAA").unwrap()),
            schema: json!({"type": "OBJECT"}),
        };
        let body = serde_json::to_value(json_request(&request)).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Describe this");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_pcm_sample_rate() {
        assert_eq!(pcm_sample_rate("audio/L16;codec=pcm;rate=16000"), 16_000);
        assert_eq!(pcm_sample_rate("audio/L16"), SPEECH_SAMPLE_RATE);
    }

    #[test]
    fn test_rejects_unusable_api_key() {
        let config = GeminiConfig {
            api_key: SecretString::from("bad\nkey"),
            api_base: crate::config::DEFAULT_GEMINI_API_BASE.into(),
            text_model: "m".into(),
            image_model: "m".into(),
            speech_model: "m".into(),
            speech_voice: "v".into(),
        };
        assert!(matches!(GeminiClient::new(&config), Err(GeminiError::InvalidApiKey)));
    }
}
