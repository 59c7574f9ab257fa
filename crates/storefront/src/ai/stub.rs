//! A scripted [`GenerationModel`] for tests and offline demos.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::{DataUri, GeminiError, GenerationError, GenerationModel, GenerationRequest};

/// Returns canned responses keyed by flow name and records every request.
#[derive(Debug, Default)]
pub struct StubModel {
    json: HashMap<String, Option<Value>>,
    image: Option<DataUri>,
    speech: Option<DataUri>,
    speech_fails: bool,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubModel {
    /// A model with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `flow` with `value`.
    #[must_use]
    pub fn with_json(mut self, flow: &str, value: Value) -> Self {
        self.json.insert(flow.to_owned(), Some(value));
        self
    }

    /// Answer `flow` with no output at all.
    #[must_use]
    pub fn with_no_output(mut self, flow: &str) -> Self {
        self.json.insert(flow.to_owned(), None);
        self
    }

    /// Return `image` from image generation.
    #[must_use]
    pub fn with_image(mut self, image: DataUri) -> Self {
        self.image = Some(image);
        self
    }

    /// Return `audio` from speech synthesis.
    #[must_use]
    pub fn with_speech(mut self, audio: DataUri) -> Self {
        self.speech = Some(audio);
        self
    }

    /// Make speech synthesis fail.
    #[must_use]
    pub const fn with_failing_speech(mut self) -> Self {
        self.speech_fails = true;
        self
    }

    /// Every JSON request received so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn unavailable(message: &str) -> GenerationError {
    GenerationError::Backend(GeminiError::Api {
        status: "UNAVAILABLE".to_owned(),
        message: message.to_owned(),
    })
}

#[async_trait]
impl GenerationModel for StubModel {
    async fn generate_json(&self, request: GenerationRequest) -> Result<Option<Value>, GenerationError> {
        let flow = request.flow;
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.json
            .get(flow)
            .cloned()
            .ok_or_else(|| unavailable(&format!("no scripted response for {flow}")))
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Option<DataUri>, GenerationError> {
        Ok(self.image.clone())
    }

    async fn synthesize_speech(&self, _text: &str) -> Result<Option<DataUri>, GenerationError> {
        if self.speech_fails {
            return Err(unavailable("speech is down"));
        }
        Ok(self.speech.clone())
    }
}
