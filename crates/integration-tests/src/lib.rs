//! Integration tests for Kala Connect.
//!
//! Tests drive the full storefront router in process: in-memory storage, an
//! in-memory session store and a scripted generation model. No database or
//! Gemini key is needed.
//!
//! ```bash
//! cargo test -p kala-connect-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Products, sellers, reviews and reels
//! - `cart` - Visitor cart, wishlist and locale
//! - `accounts` - Sign-up, sign-in, checkout and orders
//! - `shared_cart` - Shared carts and their live event stream
//! - `dashboard` - Seller dashboard overview and order fulfilment
//! - `generation` - Content generation endpoints

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, BodyDataStream};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use kala_connect_storefront::ai::StubModel;
use kala_connect_storefront::fixtures;
use kala_connect_storefront::middleware::{SESSION_COOKIE_NAME, create_session_layer};
use kala_connect_storefront::state::{AppState, Backends};

/// How long to wait for a streamed event before giving up.
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A response with its body decoded as JSON.
///
/// Empty bodies become `Null` and plain-text bodies a JSON string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of an error body.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// One browser talking to a storefront.
///
/// Keeps the session cookie between requests. Clones share the storefront
/// but start with no cookie, so they act as a second visitor.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl Clone for TestApp {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

impl TestApp {
    /// A storefront whose model has no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::with_model(StubModel::new())
    }

    /// A storefront backed by `model`.
    #[must_use]
    pub fn with_model(model: StubModel) -> Self {
        let state = AppState::new(Backends::memory(), Arc::new(model));
        let router = kala_connect_storefront::build_router(state, create_session_layer(MemoryStore::default(), false));
        Self { router, cookie: None }
    }

    /// Send a request, carrying and updating the session cookie.
    pub async fn request(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let response = self.send(method, uri, body).await;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, headers, body }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Sign in and assert it worked.
    pub async fn login(&mut self, email: &str, password: &str) -> Value {
        let response = self
            .post("/api/auth/login", serde_json::json!({ "email": email, "password": password }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.body
    }

    /// Sign in as the demo buyer.
    pub async fn login_buyer(&mut self) -> Value {
        self.login(fixtures::DEMO_BUYER_EMAIL, fixtures::DEMO_BUYER_PASSWORD).await
    }

    /// Sign in as the demo seller.
    pub async fn login_seller(&mut self) -> Value {
        self.login(fixtures::DEMO_SELLER_EMAIL, fixtures::DEMO_SELLER_PASSWORD).await
    }

    /// Open a server-sent event stream.
    pub async fn events(&mut self, uri: &str) -> EventStream {
        let response = self.send(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/event-stream"), "got {content_type}");
        EventStream {
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).expect("encode request body"))),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        self.remember_cookie(response.headers());
        response
    }

    fn remember_cookie(&mut self, headers: &HeaderMap) {
        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            if let Some(pair) = value.split(';').next().filter(|pair| pair.starts_with(&prefix)) {
                self.cookie = Some(pair.to_string());
            }
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads named events off a `text/event-stream` body.
pub struct EventStream {
    body: BodyDataStream,
    buffer: String,
}

impl EventStream {
    /// Next event as `(name, data)`, skipping keep-alive comments.
    ///
    /// Panics if nothing arrives within a few seconds.
    pub async fn next_event(&mut self) -> (String, Value) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                if let Some(event) = parse_event(&block) {
                    return event;
                }
                continue;
            }

            let chunk = tokio::time::timeout(EVENT_TIMEOUT, self.body.next())
                .await
                .expect("timed out waiting for an event")
                .expect("event stream ended")
                .expect("read event stream");
            self.buffer.push_str(std::str::from_utf8(&chunk).expect("event stream is UTF-8"));
        }
    }
}

fn parse_event(block: &str) -> Option<(String, Value)> {
    let mut name = String::from("message");
    let mut data = String::new();
    for line in block.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            name = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push_str(value.trim_start());
        }
    }
    if data.is_empty() {
        return None;
    }
    Some((name, serde_json::from_str(&data).expect("event data is JSON")))
}

/// A JSON number as `f64`, for comparing prices.
#[must_use]
pub fn amount(value: &Value) -> f64 {
    value.as_f64().expect("amount is a number")
}
