//! Core types for Kala Connect.
//!
//! This module provides type-safe wrappers and the plain records that make up
//! the catalog, carts, orders and reels.

pub mod cart;
pub mod dashboard;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod reel;
pub mod seller;
pub mod status;
pub mod user;

pub use cart::{CartItem, CartSummary};
pub use dashboard::{MonthlyRevenue, SellerOverview, TopProduct};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, ShippingAddress, TrackingStep};
pub use price::Price;
pub use product::{Product, ProductDraft, ProductSale, Review, ReviewDraft};
pub use reel::{Reel, ReelDraft};
pub use seller::Seller;
pub use status::*;
pub use user::AuthUser;
