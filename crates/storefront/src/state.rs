//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use kala_connect_core::{Seller, SellerId};

use crate::ai::GenerationModel;
use crate::db::{PgDocumentStore, PgSnapshotStorage, RepositoryError};
use crate::fixtures;
use crate::shared_cart::{DocumentStore, MemoryDocumentStore, SharedCartService};
use crate::storage::{MemorySnapshotStorage, SnapshotStorage};
use crate::stores::{AuthStore, CartStore, LocaleStore, ProductStore, ReelStore, WishlistStore};

/// Where snapshots and shared cart documents live.
pub struct Backends {
    /// Pool for readiness checks, absent in demo mode.
    pub pool: Option<PgPool>,
    pub snapshots: Arc<dyn SnapshotStorage>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Backends {
    /// In-process backends. Nothing survives a restart.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            pool: None,
            snapshots: Arc::new(MemorySnapshotStorage::new()),
            documents: Arc::new(MemoryDocumentStore::new()),
        }
    }

    /// `PostgreSQL` backends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the shared cart listener cannot connect.
    pub async fn postgres(pool: PgPool) -> Result<Self, RepositoryError> {
        let documents = PgDocumentStore::connect(pool.clone()).await?;
        Ok(Self {
            snapshots: Arc::new(PgSnapshotStorage::new(pool.clone())),
            documents: Arc::new(documents),
            pool: Some(pool),
        })
    }
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores load their snapshots lazily on first use.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: Option<PgPool>,
    products: ProductStore,
    reels: ReelStore,
    auth: AuthStore,
    carts: CartStore,
    wishlists: WishlistStore,
    locales: LocaleStore,
    shared_carts: SharedCartService,
    model: Arc<dyn GenerationModel>,
    sellers: Vec<Seller>,
}

impl AppState {
    /// Create the application state.
    #[must_use]
    pub fn new(backends: Backends, model: Arc<dyn GenerationModel>) -> Self {
        let Backends {
            pool,
            snapshots,
            documents,
        } = backends;

        Self {
            inner: Arc::new(AppStateInner {
                pool,
                products: ProductStore::new(snapshots.clone()),
                reels: ReelStore::new(snapshots.clone()),
                auth: AuthStore::new(snapshots.clone()),
                carts: CartStore::new(snapshots.clone()),
                wishlists: WishlistStore::new(snapshots.clone()),
                locales: LocaleStore::new(snapshots),
                shared_carts: SharedCartService::new(documents),
                model,
                sellers: fixtures::sellers(),
            }),
        }
    }

    /// Database pool, absent in demo mode.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn products(&self) -> &ProductStore {
        &self.inner.products
    }

    #[must_use]
    pub fn reels(&self) -> &ReelStore {
        &self.inner.reels
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    #[must_use]
    pub fn wishlists(&self) -> &WishlistStore {
        &self.inner.wishlists
    }

    #[must_use]
    pub fn locales(&self) -> &LocaleStore {
        &self.inner.locales
    }

    #[must_use]
    pub fn shared_carts(&self) -> &SharedCartService {
        &self.inner.shared_carts
    }

    /// The generation model behind the content flows.
    #[must_use]
    pub fn model(&self) -> &dyn GenerationModel {
        self.inner.model.as_ref()
    }

    #[must_use]
    pub fn sellers(&self) -> &[Seller] {
        &self.inner.sellers
    }

    #[must_use]
    pub fn seller(&self, id: &SellerId) -> Option<&Seller> {
        self.inner.sellers.iter().find(|s| &s.id == id)
    }
}
