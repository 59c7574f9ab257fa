//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server errors are captured to
//! Sentry before responding, and their details never reach the client. Every
//! error body is `{"error": "<message>"}`, including malformed request bodies,
//! which handlers read through [`ApiJson`].

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::ai::GenerationError;
use crate::services::CheckoutError;
use crate::services::auth::AuthError;
use crate::shared_cart::SharedCartError;
use crate::storage::StorageError;
use crate::stores::StoreError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const GENERATION_MESSAGE: &str = "Content generation failed. Please try again.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Snapshot storage failed outside a store.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication or account operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout was rejected or failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Shared cart operation failed.
    #[error("Shared cart error: {0}")]
    SharedCart(#[from] SharedCartError),

    /// Content generation failed.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// The session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Visitor is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Visitor is signed in but may not do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and client-facing message.
    fn classify(&self) -> (StatusCode, String) {
        match self {
            Self::Storage(_) | Self::Session(_) | Self::Internal(_) => internal(),
            Self::Store(err) => store_status(err),
            Self::Auth(err) => auth_status(err),
            Self::Checkout(err) => checkout_status(err),
            Self::SharedCart(err) => shared_cart_status(err),
            Self::Generation(err) => generation_status(err),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
}

fn store_status(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::Storage(_) => internal(),
        StoreError::ProductNotFound(_) | StoreError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Validation(_) | StoreError::UnsupportedLocale(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
    }
}

fn auth_status(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        AuthError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Please sign in first.".to_string()),
        AuthError::UserAlreadyExists => (StatusCode::CONFLICT, err.to_string()),
        AuthError::InvalidEmail(_) => (StatusCode::BAD_REQUEST, "Invalid email address".to_string()),
        AuthError::WeakPassword(msg) | AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "Account not found".to_string()),
        AuthError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        AuthError::InvalidTransition(_) => (StatusCode::CONFLICT, err.to_string()),
        AuthError::StatusNotPermitted(_) => (StatusCode::FORBIDDEN, err.to_string()),
        AuthError::Storage(_) | AuthError::PasswordHash => internal(),
    }
}

fn checkout_status(err: &CheckoutError) -> (StatusCode, String) {
    match err {
        CheckoutError::EmptyCart | CheckoutError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::ProductUnavailable(_) | CheckoutError::InsufficientStock { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CheckoutError::Store(inner) => store_status(inner),
        CheckoutError::Auth(inner) => auth_status(inner),
    }
}

fn shared_cart_status(err: &SharedCartError) -> (StatusCode, String) {
    match err {
        SharedCartError::EmptyCart => (StatusCode::BAD_REQUEST, err.to_string()),
        SharedCartError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        SharedCartError::CreateFailed => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        SharedCartError::Document(_) => internal(),
    }
}

fn generation_status(err: &GenerationError) -> (StatusCode, String) {
    match err {
        GenerationError::InvalidInput(_) | GenerationError::NoReviews => (StatusCode::BAD_REQUEST, err.to_string()),
        GenerationError::Failed(msg) => (StatusCode::BAD_GATEWAY, (*msg).to_string()),
        GenerationError::Backend(_)
        | GenerationError::MissingOutput { .. }
        | GenerationError::Decode { .. }
        | GenerationError::InvalidOutput { .. } => (StatusCode::BAD_GATEWAY, GENERATION_MESSAGE.to_string()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.classify();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// `Json` whose rejections answer with the usual error body and a 400.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper or seller action.
///
/// Breadcrumbs show up in Sentry reports as the trail leading to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String((*value).to_string()));
    }
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kala_connect_core::{OrderStatus, ProductId};

    use super::*;

    fn status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("prod-123".to_string());
        assert_eq!(err.to_string(), "Not found: prod-123");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(StoreError::ProductNotFound(ProductId::new("x"))), StatusCode::NOT_FOUND);
        assert_eq!(status(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status(StoreError::Validation("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(AuthError::InvalidTransition(
                OrderStatus::Delivered.transition(OrderStatus::Shipped).unwrap_err()
            )),
            StatusCode::CONFLICT
        );
        assert_eq!(status(GenerationError::MissingOutput { flow: "x" }), StatusCode::BAD_GATEWAY);
        assert_eq!(status(GenerationError::NoReviews), StatusCode::BAD_REQUEST);
        assert_eq!(status(CheckoutError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::Forbidden("sellers only".into())), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::Internal("boom".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let (_, message) = AppError::Internal("connection refused on 10.0.0.3".into()).classify();
        assert_eq!(message, INTERNAL_MESSAGE);

        let (_, message) = AppError::from(GenerationError::InvalidOutput {
            flow: "x",
            reason: "raw model text".into(),
        })
        .classify();
        assert_eq!(message, GENERATION_MESSAGE);
    }

    #[tokio::test]
    async fn test_bad_json_body_is_an_error_body() {
        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"quantity": "many"}"#))
            .unwrap();
        let rejection = ApiJson::<serde_json::Value>::from_request(request, &()).await;
        assert!(rejection.is_ok());

        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let Err(err) = ApiJson::<serde_json::Value>::from_request(request, &()).await else {
            panic!("malformed JSON was accepted");
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[test]
    fn test_checkout_delegates_to_auth() {
        let err = CheckoutError::Auth(AuthError::NotAuthenticated);
        assert_eq!(status(err), StatusCode::UNAUTHORIZED);
    }
}
