//! Database migration command.
//!
//! Runs the storefront migrations (`crates/storefront/migrations/`) and
//! creates the session table used by `tower-sessions`.
//!
//! # Environment Variables
//!
//! - `KALA_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use super::{CommandError, connect};

/// Run all storefront migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    info!("Storefront migrations complete!");
    Ok(())
}
