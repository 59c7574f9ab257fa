//! CLI command implementations.

pub mod generate;
pub mod migrate;
pub mod seed;

use kala_connect_storefront::ai::{GeminiError, GenerationError};
use kala_connect_storefront::config::ConfigError;
use kala_connect_storefront::storage::StorageError;
use thiserror::Error;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("KALA_DATABASE_URL (or DATABASE_URL) is not set")]
    MissingDatabaseUrl,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Could not read {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid flow input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("Could not encode flow output: {0}")]
    Output(serde_json::Error),

    #[error("Gemini client error: {0}")]
    Gemini(#[from] GeminiError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Connect to the storefront database.
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    let database_url =
        kala_connect_storefront::config::database_url_from_env().ok_or(CommandError::MissingDatabaseUrl)?;
    tracing::info!("Connecting to storefront database...");
    Ok(kala_connect_storefront::db::create_pool(&database_url).await?)
}
