//! Business logic that spans more than one store.
//!
//! # Services
//!
//! - `auth` - Password hashing and account errors
//! - `checkout` - Turning a visitor's cart into an order

pub mod auth;
pub mod checkout;

pub use checkout::{Checkout, CheckoutError};
