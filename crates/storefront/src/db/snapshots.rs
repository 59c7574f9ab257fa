//! Snapshot storage in `storefront.snapshot`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;
use crate::storage::{SnapshotStorage, StorageError};

/// Snapshot storage backed by a JSONB table.
#[derive(Debug, Clone)]
pub struct PgSnapshotStorage {
    pool: PgPool,
}

impl PgSnapshotStorage {
    /// Create a storage over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStorage for PgSnapshotStorage {
    #[instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let value = sqlx::query_scalar::<_, Value>("SELECT value FROM storefront.snapshot WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO storefront.snapshot (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM storefront.snapshot WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}
