//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Readiness (database)
//!
//! # Catalog
//! GET  /api/products                        - Catalog (?seller=)
//! POST /api/products                        - List a product (seller)
//! GET  /api/products/{id}                   - Product detail
//! POST /api/products/{id}/reviews           - Add a review
//! GET  /api/sellers                         - Seller profiles
//! GET  /api/sellers/{id}                    - Profile with products and reels
//! GET  /api/reels                           - Reel feed
//! POST /api/reels                           - Publish a reel (seller)
//!
//! # Cart (per visitor)
//! GET    /api/cart                          - Lines and totals
//! DELETE /api/cart                          - Empty the cart
//! POST   /api/cart/items                    - Add a product
//! PATCH  /api/cart/items/{id}               - Set quantity (<= 0 removes)
//! DELETE /api/cart/items/{id}               - Remove a line
//! POST   /api/cart/share                    - Publish as a shared cart
//!
//! # Shared carts
//! GET    /api/shared-carts/{id}             - Current document
//! GET    /api/shared-carts/{id}/events      - Live updates (SSE)
//! PATCH  /api/shared-carts/{id}/items/{pid} - Set quantity
//! DELETE /api/shared-carts/{id}/items/{pid} - Remove a line
//!
//! # Wishlist and locale (per visitor)
//! GET    /api/wishlist                      - Wishlisted products
//! POST   /api/wishlist/{id}/toggle          - Add or remove
//! DELETE /api/wishlist/{id}                 - Remove
//! GET    /api/locale                        - Current language
//! PUT    /api/locale                        - Change language
//!
//! # Auth and account
//! POST   /api/auth/signup                   - Create an account
//! POST   /api/auth/login                    - Sign in
//! POST   /api/auth/logout                   - Sign out
//! GET    /api/account                       - Signed-in account
//! PATCH  /api/account                       - Update name or password
//! DELETE /api/account                       - Delete account
//! POST   /api/checkout                      - Place an order
//! GET    /api/orders                        - Order history
//! GET    /api/orders/{id}                   - Order detail
//! GET    /api/orders/{id}/tracking          - Delivery steps
//! POST   /api/orders/{id}/status            - Cancel or return (buyer)
//!
//! # Seller dashboard
//! GET    /api/dashboard                     - Revenue, best sellers, low stock
//! POST   /api/dashboard/orders/{id}/status  - Ship or deliver an order
//!
//! # Content generation
//! POST /api/ai/{flow}                       - See [`ai`]
//! ```

pub mod account;
pub mod ai;
pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod health;
pub mod locale;
pub mod products;
pub mod reels;
pub mod sellers;
pub mod shared_carts;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Catalog, seller and reel routes.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/reviews", post(products::add_review))
        .route("/sellers", get(sellers::index))
        .route("/sellers/{id}", get(sellers::show))
        .route("/reels", get(reels::index).post(reels::create))
}

/// Visitor cart, shared cart, wishlist and locale routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add))
        .route("/cart/items/{id}", patch(cart::update).delete(cart::remove))
        .route("/cart/share", post(cart::share))
        .route("/shared-carts/{id}", get(shared_carts::show))
        .route("/shared-carts/{id}/events", get(shared_carts::events))
        .route(
            "/shared-carts/{id}/items/{product}",
            patch(shared_carts::update).delete(shared_carts::remove),
        )
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/{id}/toggle", post(wishlist::toggle))
        .route("/wishlist/{id}", delete(wishlist::remove))
        .route("/locale", get(locale::show).put(locale::update))
}

/// Auth, account, checkout and order routes.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/account",
            get(account::show).patch(account::update).delete(account::delete),
        )
        .route("/checkout", post(account::checkout))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
        .route("/orders/{id}/tracking", get(account::tracking))
        .route("/orders/{id}/status", post(account::update_status))
}

/// Seller dashboard routes.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::overview))
        .route("/dashboard/orders/{id}/status", post(dashboard::fulfil))
}

/// Content generation routes.
pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/product-listing", post(ai::product_listing))
        .route("/reel-caption", post(ai::reel_caption))
        .route("/promo-reel", post(ai::promo_reel))
        .route("/seller-story", post(ai::seller_story))
        .route("/review-sentiment", post(ai::review_sentiment))
        .route("/festival-forecast", post(ai::festival_forecast))
        .route("/inventory-advice", post(ai::inventory_advice))
        .route("/fashion-design", post(ai::fashion_design))
        .route("/product-search", post(ai::product_search))
        .route("/speech", post(ai::speech))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(account_routes())
        .merge(dashboard_routes())
        .nest("/ai", ai_routes());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}
