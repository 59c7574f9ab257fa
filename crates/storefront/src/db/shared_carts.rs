//! Shared cart documents in `storefront.shared_cart`.
//!
//! Every insert or update fires `pg_notify('shared_cart', id)` from a table
//! trigger. One background task per store holds a `LISTEN shared_cart`
//! connection, re-reads the changed document and fans it out to local
//! subscribers, so a write made by any storefront instance reaches every
//! viewer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tracing::{debug, instrument, warn};

use kala_connect_core::{CartItem, SharedCartId};

use super::RepositoryError;
use crate::shared_cart::{DocumentStore, DocumentStoreError, SharedCartDocument, Subscription};
use crate::shared_cart::document::Channels;

/// Notification channel written by the `shared_cart_changed` trigger.
pub const NOTIFY_CHANNEL: &str = "shared_cart";

/// Delay before re-polling the listener after a connection error.
const LISTENER_RETRY: Duration = Duration::from_secs(1);

/// Shared cart documents stored in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    channels: Arc<Channels>,
}

impl PgDocumentStore {
    /// Create the store and start its notification listener.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the listener cannot connect.
    pub async fn connect(pool: PgPool) -> Result<Self, RepositoryError> {
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        let store = Self {
            pool,
            channels: Arc::new(Channels::default()),
        };

        let worker = store.clone();
        tokio::spawn(async move { worker.listen(listener).await });

        Ok(store)
    }

    async fn listen(self, mut listener: PgListener) {
        loop {
            match listener.recv().await {
                Ok(notification) => {
                    let id = SharedCartId::new(notification.payload());
                    if !self.channels.has_subscribers(&id) {
                        continue;
                    }
                    match fetch(&self.pool, &id).await {
                        Ok(Some(document)) => self.channels.publish(&id, document),
                        Ok(None) => debug!(cart_id = %id, "Notified shared cart no longer exists"),
                        Err(e) => warn!(cart_id = %id, error = %e, "Could not read notified shared cart"),
                    }
                }
                Err(e) => {
                    // PgListener reconnects on the next recv
                    warn!(error = %e, "Shared cart listener lost its connection");
                    tokio::time::sleep(LISTENER_RETRY).await;
                }
            }
        }
    }
}

type DocumentRow = (Value, DateTime<Utc>);

fn decode(row: DocumentRow) -> Result<SharedCartDocument, DocumentStoreError> {
    let (items, created_at) = row;
    let items: Vec<CartItem> = serde_json::from_value(items).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid shared cart items: {e}"))
    })?;
    Ok(SharedCartDocument { items, created_at })
}

async fn fetch(pool: &PgPool, id: &SharedCartId) -> Result<Option<SharedCartDocument>, DocumentStoreError> {
    let row = sqlx::query_as::<_, DocumentRow>(
        "SELECT items, created_at FROM storefront.shared_cart WHERE id = $1",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await
    .map_err(RepositoryError::from)?;

    row.map(decode).transpose()
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self, document), fields(cart_id = %id))]
    async fn create(&self, id: &SharedCartId, document: &SharedCartDocument) -> Result<(), DocumentStoreError> {
        let items = serde_json::to_value(&document.items)?;
        sqlx::query(
            "INSERT INTO storefront.shared_cart (id, items, created_at) VALUES ($1, $2, $3)",
        )
        .bind(id.as_str())
        .bind(items)
        .bind(document.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DocumentStoreError::AlreadyExists(id.clone());
            }
            DocumentStoreError::Database(RepositoryError::Database(e))
        })?;
        Ok(())
    }

    #[instrument(skip(self), fields(cart_id = %id))]
    async fn get(&self, id: &SharedCartId) -> Result<Option<SharedCartDocument>, DocumentStoreError> {
        fetch(&self.pool, id).await
    }

    #[instrument(skip(self, items), fields(cart_id = %id, lines = items.len()))]
    async fn merge_items(&self, id: &SharedCartId, items: &[CartItem]) -> Result<SharedCartDocument, DocumentStoreError> {
        let value = serde_json::to_value(items)?;
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            UPDATE storefront.shared_cart
            SET items = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING items, created_at
            ",
        )
        .bind(id.as_str())
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(decode)
            .transpose()?
            .ok_or_else(|| DocumentStoreError::NotFound(id.clone()))
    }

    async fn subscribe(&self, id: &SharedCartId) -> Result<Subscription, DocumentStoreError> {
        Ok(self.channels.subscribe(id))
    }
}
