//! Error types for the Gemini API client.

use thiserror::Error;

/// Errors that can occur when calling the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini returned an error body.
    #[error("API error ({status}): {message}")]
    Api {
        /// Status name from the API, e.g. `INVALID_ARGUMENT`.
        status: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The API key cannot be sent as a header.
    #[error("API key contains invalid header characters")]
    InvalidApiKey,

    /// The prompt was blocked before generation.
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Error body returned by the API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// HTTP status code.
    #[serde(default)]
    pub code: u16,
    /// Error message.
    pub message: String,
    /// Status name.
    #[serde(default)]
    pub status: String,
}
