//! `data:<mime>;base64,<payload>` URIs, the form media travels in between the
//! browser, the flows and the model.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    #[error("expected a data: URI")]
    MissingScheme,
    #[error("data URI has no payload")]
    MissingPayload,
    #[error("data URI must be base64 encoded")]
    NotBase64,
    #[error("data URI has an invalid media type")]
    InvalidMime,
    #[error("data URI payload is not valid base64")]
    InvalidPayload,
}

/// A validated base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUri {
    mime: String,
    payload: String,
}

impl DataUri {
    /// Parse and validate a data URI, including its payload.
    ///
    /// # Errors
    ///
    /// Returns a `DataUriError` naming the first problem found.
    pub fn parse(s: &str) -> Result<Self, DataUriError> {
        let rest = s.strip_prefix("data:").ok_or(DataUriError::MissingScheme)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUriError::MissingPayload)?;
        let mime = meta.strip_suffix(";base64").ok_or(DataUriError::NotBase64)?;

        let essence = mime.split(';').next().unwrap_or_default();
        match essence.split_once('/') {
            Some((kind, sub)) if !kind.is_empty() && !sub.is_empty() => {}
            _ => return Err(DataUriError::InvalidMime),
        }
        if payload.is_empty() {
            return Err(DataUriError::MissingPayload);
        }
        STANDARD
            .decode(payload)
            .map_err(|_| DataUriError::InvalidPayload)?;

        Ok(Self {
            mime: mime.to_owned(),
            payload: payload.to_owned(),
        })
    }

    /// Encode raw bytes.
    #[must_use]
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: mime.to_owned(),
            payload: STANDARD.encode(bytes),
        }
    }

    /// Wrap an already base64-encoded payload, e.g. inline data returned by the model.
    ///
    /// # Errors
    ///
    /// Same as [`Self::parse`].
    pub fn from_base64(mime: &str, payload: &str) -> Result<Self, DataUriError> {
        Self::parse(&format!("data:{mime};base64,{payload}"))
    }

    /// Media type, including any parameters.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Base64 payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decoded payload bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        // payload was validated on construction
        STANDARD.decode(&self.payload).unwrap_or_default()
    }

    /// Whether the media type is `image/*`.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

impl TryFrom<String> for DataUri {
    type Error = DataUriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataUri> for String {
    fn from(uri: DataUri) -> Self {
        uri.to_string()
    }
}
