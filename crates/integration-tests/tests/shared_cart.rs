//! Integration tests for shared carts and their live update stream.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use kala_connect_integration_tests::{TestApp, amount};

fn quantity_of(items: &Value, product_id: &str) -> Option<u64> {
    items
        .as_array()
        .unwrap()
        .iter()
        .find(|line| line["id"] == product_id)
        .map(|line| line["quantity"].as_u64().unwrap())
}

/// Fill a cart and share it. Returns the shared cart id.
async fn share_cart(app: &mut TestApp) -> String {
    app.post("/api/cart/items", json!({"productId": "prod-1"})).await;
    app.post("/api/cart/items", json!({"productId": "prod-5", "quantity": 2})).await;

    let response = app.post("/api/cart/share", json!({})).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap().to_string();
    assert_eq!(response.body["path"], format!("/cart/shared/{id}"));
    id
}

// =============================================================================
// Sharing
// =============================================================================

#[tokio::test]
async fn test_share_and_view() {
    let mut owner = TestApp::new();
    let id = share_cart(&mut owner).await;

    let mut friend = owner.clone();
    let response = friend.get(&format!("/api/shared-carts/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], id.as_str());
    assert_eq!(quantity_of(&response.body["items"], "prod-5"), Some(2));
    // 999 + 2 x 749
    assert!((amount(&response.body["subtotal"]) - 2497.0).abs() < f64::EPSILON);
    assert!(response.body["createdAt"].is_string());
}

#[tokio::test]
async fn test_sharing_empty_cart_is_rejected() {
    let mut app = TestApp::new();
    let response = app.post("/api/cart/share", json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_shared_cart_is_not_found() {
    let mut app = TestApp::new();
    let response = app.get("/api/shared-carts/nope").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .patch("/api/shared-carts/nope/items/prod-1", json!({"quantity": 2}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shared_cart_is_a_snapshot() {
    let mut owner = TestApp::new();
    let id = share_cart(&mut owner).await;

    // Later edits to the owner's cart do not touch the shared copy
    owner.delete("/api/cart").await;
    let shared = owner.get(&format!("/api/shared-carts/{id}")).await.body;
    assert_eq!(shared["items"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Editing
// =============================================================================

#[tokio::test]
async fn test_friend_updates_quantity() {
    let mut owner = TestApp::new();
    let id = share_cart(&mut owner).await;
    let mut friend = owner.clone();

    let response = friend
        .patch(&format!("/api/shared-carts/{id}/items/prod-1"), json!({"quantity": 3}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["outcome"], "applied");
    assert_eq!(quantity_of(&response.body["items"], "prod-1"), Some(3));

    let shared = owner.get(&format!("/api/shared-carts/{id}")).await.body;
    assert_eq!(quantity_of(&shared["items"], "prod-1"), Some(3));
}

#[tokio::test]
async fn test_non_positive_quantities_drop_lines() {
    let mut app = TestApp::new();
    let id = share_cart(&mut app).await;

    let response = app
        .patch(&format!("/api/shared-carts/{id}/items/prod-1"), json!({"quantity": 0}))
        .await;
    assert_eq!(quantity_of(&response.body["items"], "prod-1"), None);

    let response = app
        .patch(&format!("/api/shared-carts/{id}/items/prod-5"), json!({"quantity": -3}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_drops_line() {
    let mut app = TestApp::new();
    let id = share_cart(&mut app).await;

    let response = app.delete(&format!("/api/shared-carts/{id}/items/prod-5")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantity_of(&response.body["items"], "prod-5"), None);
    assert_eq!(quantity_of(&response.body["items"], "prod-1"), Some(1));
}

// =============================================================================
// Live updates
// =============================================================================

#[tokio::test]
async fn test_event_stream_sends_current_cart_then_changes() {
    let mut owner = TestApp::new();
    let id = share_cart(&mut owner).await;

    let mut viewer = owner.clone();
    let mut events = viewer.events(&format!("/api/shared-carts/{id}/events")).await;

    let (name, cart) = events.next_event().await;
    assert_eq!(name, "cart");
    assert_eq!(quantity_of(&cart["items"], "prod-1"), Some(1));

    let mut editor = owner.clone();
    editor
        .patch(&format!("/api/shared-carts/{id}/items/prod-1"), json!({"quantity": 4}))
        .await;

    let (name, cart) = events.next_event().await;
    assert_eq!(name, "cart");
    assert_eq!(cart["id"], id.as_str());
    assert_eq!(quantity_of(&cart["items"], "prod-1"), Some(4));
}

#[tokio::test]
async fn test_event_stream_for_unknown_cart_is_not_found() {
    let mut app = TestApp::new();
    let response = app.get("/api/shared-carts/nope/events").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
