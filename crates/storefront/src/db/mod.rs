//! `PostgreSQL` backends for snapshot storage and shared carts.
//!
//! # Schema: `storefront`
//!
//! - `snapshot` - Whole-store JSON snapshots keyed by storage key
//! - `shared_cart` - Shared cart documents, change-notified on the
//!   `shared_cart` channel
//! - `tower_sessions.session` - Session storage (created by `PostgresStore::migrate`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p kala-connect-cli -- migrate
//! ```

pub mod shared_carts;
pub mod snapshots;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use shared_carts::PgDocumentStore;
pub use snapshots::PgSnapshotStorage;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
