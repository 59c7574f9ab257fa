//! Integration tests for the catalog: products, sellers, reviews and reels.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use kala_connect_integration_tests::{TestApp, amount};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new();
    assert_eq!(app.get("/health").await.status, StatusCode::OK);
    // No database in memory mode
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let mut app = TestApp::new();
    let response = app.get("/api/products").await;
    assert!(response.headers.contains_key("x-request-id"));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_catalog_lists_fixture_products() {
    let mut app = TestApp::new();
    let response = app.get("/api/products").await;
    assert_eq!(response.status, StatusCode::OK);

    let products = response.body.as_array().unwrap();
    assert_eq!(products.len(), 8);
    assert!(products.iter().any(|p| p["id"] == "prod-1"));
}

#[tokio::test]
async fn test_catalog_filters_by_seller() {
    let mut app = TestApp::new();
    let response = app.get("/api/products?seller=seller-2").await;
    let products = response.body.as_array().unwrap();
    assert!(!products.is_empty());
    assert!(products.iter().all(|p| p["sellerId"] == "seller-2"));
}

#[tokio::test]
async fn test_product_detail() {
    let mut app = TestApp::new();
    let response = app.get("/api/products/prod-1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Blue Pottery Vase");
    assert!((amount(&response.body["price"]) - 999.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut app = TestApp::new();
    let response = app.get("/api/products/prod-404").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Product not found");
}

#[tokio::test]
async fn test_add_review() {
    let mut app = TestApp::new();
    let response = app
        .post(
            "/api/products/prod-2/reviews",
            json!({"author": "Divya", "rating": 5, "comment": "Stunning detail."}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let product = app.get("/api/products/prod-2").await.body;
    let reviews = product["reviews"].as_array().unwrap();
    assert!(reviews.iter().any(|r| r["author"] == "Divya"));
}

#[tokio::test]
async fn test_review_rating_out_of_range_is_rejected() {
    let mut app = TestApp::new();
    let response = app
        .post(
            "/api/products/prod-2/reviews",
            json!({"author": "Divya", "rating": 9, "comment": "Too good."}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Seller listings
// =============================================================================

fn new_product() -> serde_json::Value {
    json!({
        "name": "Warli Wall Plate",
        "description": "A terracotta plate painted with Warli figures.",
        "price": 650,
        "tags": ["home-decor"],
        "image": "https://placehold.co/600x600.png?text=warli",
    })
}

#[tokio::test]
async fn test_listing_requires_sign_in() {
    let mut app = TestApp::new();
    let response = app.post("/api/products", new_product()).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_buyer_cannot_list_products() {
    let mut app = TestApp::new();
    app.login_buyer().await;
    let response = app.post("/api/products", new_product()).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_seller_lists_product_under_dashboard_seller() {
    let mut app = TestApp::new();
    app.login_seller().await;

    let response = app.post("/api/products", new_product()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["sellerId"], "seller-1");

    let id = response.body["id"].as_str().unwrap().to_string();
    let shown = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["name"], "Warli Wall Plate");

    // Visible to other visitors too
    let mut other = app.clone();
    let catalog = other.get("/api/products").await.body;
    assert!(catalog.as_array().unwrap().iter().any(|p| p["id"] == id.as_str()));
}

#[tokio::test]
async fn test_listing_without_name_is_rejected() {
    let mut app = TestApp::new();
    app.login_seller().await;
    let mut body = new_product();
    body["name"] = json!("  ");
    let response = app.post("/api/products", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Sellers and reels
// =============================================================================

#[tokio::test]
async fn test_seller_profile_includes_products() {
    let mut app = TestApp::new();
    let response = app.get("/api/sellers/seller-1").await;
    assert_eq!(response.status, StatusCode::OK);

    let products = response.body["products"].as_array().unwrap();
    assert!(!products.is_empty());
    assert!(products.iter().all(|p| p["sellerId"] == "seller-1"));
    assert!(response.body["reels"].is_array());
}

#[tokio::test]
async fn test_unknown_seller_is_not_found() {
    let mut app = TestApp::new();
    assert_eq!(app.get("/api/sellers/seller-99").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seller_publishes_reel() {
    let mut app = TestApp::new();
    app.login_seller().await;

    let response = app
        .post(
            "/api/reels",
            json!({
                "caption": "Glazing the vases",
                "taggedProductIds": ["prod-1"],
                "videoUrl": "https://example.com/reel.mp4",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let reels = app.get("/api/reels").await.body;
    assert!(
        reels
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r["caption"] == "Glazing the vases")
    );
}

#[tokio::test]
async fn test_reel_without_video_is_rejected() {
    let mut app = TestApp::new();
    app.login_seller().await;
    let response = app
        .post("/api/reels", json!({"caption": "No video", "videoUrl": ""}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
