//! Kala Connect storefront library.
//!
//! The storefront JSON API, seller dashboard endpoints and content generation
//! flows, exposed as a library so the binary, the CLI and the integration
//! tests share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shared_cart;
pub mod state;
pub mod storage;
pub mod stores;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::state::AppState;

/// Largest accepted request body. Product photos and reel videos arrive as
/// data URIs.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the storefront router with its middleware stack.
///
/// The Sentry layers are added by the binary, outside this router.
pub fn build_router<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record("latency_ms", u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
