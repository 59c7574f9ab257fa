//! Kala Connect Core - Shared domain types.
//!
//! This crate provides the records used across all Kala Connect components:
//! - `storefront` - Storefront, seller dashboard and generation API
//! - `cli` - Migrations, fixture seeding and flow runner
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no database
//! access, no HTTP clients. Cart totals and order status rules live here so
//! every caller computes them the same way.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, prices, statuses and the catalog/cart/order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
