//! Seed snapshot storage with the built-in fixtures.
//!
//! Writes the catalog and reel feed, then loads the account store once so it
//! seeds and persists the demo buyer and seller. Existing snapshots are kept
//! unless `--force` is given.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use kala_connect_storefront::db::PgSnapshotStorage;
use kala_connect_storefront::fixtures;
use kala_connect_storefront::storage::{SnapshotStorage, StorageError, keys, write_snapshot};
use kala_connect_storefront::stores::AuthStore;

use super::{CommandError, connect};

/// Seed the storefront database.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a write fails.
pub async fn run(force: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let storage: Arc<dyn SnapshotStorage> = Arc::new(PgSnapshotStorage::new(pool));
    seed(storage, force).await?;
    info!("Seeding complete!");
    Ok(())
}

/// Seed `storage`.
async fn seed(storage: Arc<dyn SnapshotStorage>, force: bool) -> Result<(), StorageError> {
    seed_snapshot(&*storage, keys::PRODUCTS, &fixtures::products(), force).await?;
    seed_snapshot(&*storage, keys::REELS, &fixtures::reels(), force).await?;

    if force {
        storage.remove(keys::USERS).await?;
    }
    let accounts = AuthStore::new(storage.clone()).all_users().await;
    if storage.load(keys::USERS).await?.is_none() {
        tracing::warn!("Demo accounts were not persisted");
    }
    info!(accounts = accounts.len(), "Accounts ready");
    Ok(())
}

/// Write `value` under `key` unless the key exists. Returns whether it wrote.
async fn seed_snapshot<T: Serialize + Sync>(
    storage: &dyn SnapshotStorage,
    key: &str,
    value: &T,
    force: bool,
) -> Result<bool, StorageError> {
    if !force && storage.load(key).await?.is_some() {
        info!(key, "Snapshot exists, skipping");
        return Ok(false);
    }
    write_snapshot(storage, key, value).await?;
    info!(key, "Snapshot written");
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kala_connect_core::Product;
    use kala_connect_storefront::storage::{MemorySnapshotStorage, read_snapshot};

    use super::*;

    #[tokio::test]
    async fn test_seed_writes_fixtures_and_accounts() {
        let storage: Arc<dyn SnapshotStorage> = Arc::new(MemorySnapshotStorage::new());
        seed(storage.clone(), false).await.unwrap();

        let products: Vec<Product> = read_snapshot(&*storage, keys::PRODUCTS).await.unwrap();
        assert_eq!(products.len(), fixtures::products().len());
        assert!(storage.load(keys::USERS).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_existing_snapshot_is_kept_unless_forced() {
        let storage = MemorySnapshotStorage::new();
        let mine = vec![fixtures::products().remove(0)];
        write_snapshot(&storage, keys::PRODUCTS, &mine).await.unwrap();

        assert!(!seed_snapshot(&storage, keys::PRODUCTS, &fixtures::products(), false).await.unwrap());
        let kept: Vec<Product> = read_snapshot(&storage, keys::PRODUCTS).await.unwrap();
        assert_eq!(kept.len(), 1);

        assert!(seed_snapshot(&storage, keys::PRODUCTS, &fixtures::products(), true).await.unwrap());
        let replaced: Vec<Product> = read_snapshot(&storage, keys::PRODUCTS).await.unwrap();
        assert_eq!(replaced.len(), fixtures::products().len());
    }
}
