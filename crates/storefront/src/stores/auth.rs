//! Accounts, sign-in pointers and order history.
//!
//! All accounts live in one snapshot keyed by email. A visitor is signed in
//! when its auth pointer (`kala-connect-auth/<visitor>`) names an existing
//! account; a pointer to a deleted account reads as signed out and is removed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, instrument, warn};

use kala_connect_core::{
    AuthUser, CartItem, Email, Order, OrderId, OrderStatus, SellerId, ShippingAddress, UserRole,
};

use crate::fixtures;
use crate::models::VisitorId;
use crate::services::auth::{AuthError, hash_password, validate_password, verify_password};
use crate::storage::{SnapshotStorage, keys, read_snapshot, write_snapshot};

/// An account as persisted.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    /// Plain-text password of accounts written before hashing; upgraded on load.
    #[serde(default, skip_serializing)]
    password: Option<String>,
    role: UserRole,
    name: String,
    #[serde(default)]
    sustainability_coins: u32,
    #[serde(default)]
    orders: Vec<Order>,
}

impl StoredUser {
    fn to_auth_user(&self, email: Email) -> AuthUser {
        AuthUser {
            email,
            role: self.role,
            name: self.name.clone(),
            sustainability_coins: self.sustainability_coins,
            orders: self.orders.clone(),
        }
    }
}

type Users = BTreeMap<String, StoredUser>;

/// What the auth pointer stores.
#[derive(Serialize, Deserialize)]
struct AuthPointer {
    email: String,
}

/// Profile changes. `None` leaves a field unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Account store.
pub struct AuthStore {
    storage: Arc<dyn SnapshotStorage>,
    users: OnceCell<Mutex<Users>>,
}

impl AuthStore {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self {
            storage,
            users: OnceCell::new(),
        }
    }

    async fn users(&self) -> &Mutex<Users> {
        self.users
            .get_or_init(|| async { Mutex::new(self.hydrate().await) })
            .await
    }

    async fn hydrate(&self) -> Users {
        let mut users: Users = read_snapshot(&*self.storage, keys::USERS).await.unwrap_or_default();

        let upgraded = upgrade_legacy_passwords(&mut users);
        let seeded = seed_demo_users(&mut users);
        if (upgraded || seeded)
            && let Err(e) = write_snapshot(&*self.storage, keys::USERS, &users).await
        {
            warn!(error = %e, "Could not persist seeded accounts");
        }
        users
    }

    async fn mutate<R>(&self, f: impl FnOnce(&mut Users) -> Result<R, AuthError>) -> Result<R, AuthError> {
        let mut users = self.users().await.lock().await;
        let mut next = users.clone();
        let result = f(&mut next)?;
        write_snapshot(&*self.storage, keys::USERS, &next).await?;
        *users = next;
        Ok(result)
    }

    /// Create an account. Does not sign the visitor in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `AuthError::WeakPassword`,
    /// `AuthError::Validation` for a blank name, `AuthError::UserAlreadyExists`
    /// for a taken email, or `AuthError::Storage` on write failure.
    #[instrument(skip(self, password), fields(email = %email, role = %role))]
    pub async fn signup(&self, name: &str, email: &str, password: &str, role: UserRole) -> Result<AuthUser, AuthError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required.".into()));
        }
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = StoredUser {
            password_hash: Some(password_hash),
            password: None,
            role,
            name: name.to_owned(),
            sustainability_coins: 0,
            orders: Vec::new(),
        };
        let created = user.to_auth_user(email.clone());

        self.mutate(|users| {
            if users.contains_key(email.as_str()) {
                return Err(AuthError::UserAlreadyExists);
            }
            users.insert(email.as_str().to_owned(), user);
            Ok(())
        })
        .await?;

        info!("Account created");
        Ok(created)
    }

    /// Check credentials and sign `visitor` in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or wrong
    /// password alike, or `AuthError::Storage` if the pointer cannot be written.
    #[instrument(skip(self, password))]
    pub async fn login(&self, visitor: VisitorId, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = {
            let users = self.users().await.lock().await;
            users
                .get(email.as_str())
                .cloned()
                .ok_or(AuthError::InvalidCredentials)?
        };
        let hash = user.password_hash.as_deref().ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, hash)?;

        let pointer = AuthPointer {
            email: email.as_str().to_owned(),
        };
        write_snapshot(&*self.storage, &keys::auth(visitor), &pointer).await?;

        info!("Signed in");
        Ok(user.to_auth_user(email))
    }

    /// Sign `visitor` out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the pointer cannot be removed.
    pub async fn logout(&self, visitor: VisitorId) -> Result<(), AuthError> {
        self.storage.remove(&keys::auth(visitor)).await?;
        Ok(())
    }

    /// The account `visitor` is signed in to, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if a stale pointer cannot be removed.
    pub async fn current(&self, visitor: VisitorId) -> Result<Option<AuthUser>, AuthError> {
        let Some(pointer) = read_snapshot::<AuthPointer>(&*self.storage, &keys::auth(visitor)).await else {
            return Ok(None);
        };
        let Ok(email) = Email::parse(&pointer.email) else {
            self.logout(visitor).await?;
            return Ok(None);
        };

        let user = self.users().await.lock().await.get(email.as_str()).cloned();
        match user {
            Some(user) => Ok(Some(user.to_auth_user(email))),
            None => {
                self.logout(visitor).await?;
                Ok(None)
            }
        }
    }

    /// Look up an account by email.
    pub async fn user(&self, email: &Email) -> Option<AuthUser> {
        self.users()
            .await
            .lock()
            .await
            .get(email.as_str())
            .map(|u| u.to_auth_user(email.clone()))
    }

    /// Every account. The seller dashboard counts pending orders across them.
    pub async fn all_users(&self) -> Vec<AuthUser> {
        self.users()
            .await
            .lock()
            .await
            .iter()
            .filter_map(|(email, u)| Email::parse(email).ok().map(|e| u.to_auth_user(e)))
            .collect()
    }

    /// Change name and/or password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound`, `AuthError::Validation` for a blank
    /// name, `AuthError::WeakPassword`, or `AuthError::Storage`.
    #[instrument(skip(self, update), fields(email = %email))]
    pub async fn update_user(&self, email: &Email, update: ProfileUpdate) -> Result<AuthUser, AuthError> {
        let name = match update.name.as_deref().map(str::trim) {
            Some("") => return Err(AuthError::Validation("Name cannot be blank.".into())),
            other => other.map(str::to_owned),
        };
        let password_hash = match update.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        self.mutate(|users| {
            let user = users.get_mut(email.as_str()).ok_or(AuthError::UserNotFound)?;
            if let Some(name) = name {
                user.name = name;
            }
            if let Some(hash) = password_hash {
                user.password_hash = Some(hash);
            }
            Ok(user.to_auth_user(email.clone()))
        })
        .await
    }

    /// Delete the account and sign `visitor` out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` or `AuthError::Storage`.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn delete_account(&self, visitor: VisitorId, email: &Email) -> Result<(), AuthError> {
        self.mutate(|users| {
            users.remove(email.as_str()).map(drop).ok_or(AuthError::UserNotFound)
        })
        .await?;
        self.logout(visitor).await?;
        info!("Account deleted");
        Ok(())
    }

    /// Record an order on the account and credit its reward points.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` or `AuthError::Storage`.
    #[instrument(skip(self, items, address), fields(email = %email, lines = items.len()))]
    pub async fn place_order(
        &self,
        email: &Email,
        items: Vec<CartItem>,
        address: ShippingAddress,
    ) -> Result<Order, AuthError> {
        let order = Order::place(items, address);
        let placed = order.clone();
        self.mutate(|users| {
            let user = users.get_mut(email.as_str()).ok_or(AuthError::UserNotFound)?;
            user.sustainability_coins = user.sustainability_coins.saturating_add(order.points_earned);
            user.orders.insert(0, order);
            Ok(())
        })
        .await?;

        info!(order_id = %placed.id, total = %placed.total, "Order placed");
        Ok(placed)
    }

    /// One order on the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` or `AuthError::OrderNotFound`.
    pub async fn order(&self, email: &Email, order_id: &OrderId) -> Result<Order, AuthError> {
        let users = self.users().await.lock().await;
        let user = users.get(email.as_str()).ok_or(AuthError::UserNotFound)?;
        user.orders
            .iter()
            .find(|o| &o.id == order_id)
            .cloned()
            .ok_or_else(|| AuthError::OrderNotFound(order_id.clone()))
    }

    /// Cancel or return one of the account's own orders.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StatusNotPermitted` for anything but `Cancelled` or
    /// `Returned`, `AuthError::OrderNotFound`, `AuthError::InvalidTransition`
    /// for a change outside the order lifecycle, or `AuthError::Storage`.
    #[instrument(skip(self), fields(email = %email, order_id = %order_id, status = ?status))]
    pub async fn update_order_status(
        &self,
        email: &Email,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, AuthError> {
        if !status.is_buyer_request() {
            return Err(AuthError::StatusNotPermitted(status));
        }
        self.mutate(|users| {
            let user = users.get_mut(email.as_str()).ok_or(AuthError::UserNotFound)?;
            let order = user
                .orders
                .iter_mut()
                .find(|o| &o.id == order_id)
                .ok_or_else(|| AuthError::OrderNotFound(order_id.clone()))?;
            order.status = order.status.transition(status)?;
            Ok(order.clone())
        })
        .await
    }

    /// Mark a buyer's order `Shipped` or `Delivered` on behalf of a seller
    /// whose products it contains.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StatusNotPermitted` for any other status,
    /// `AuthError::OrderNotFound` when no buyer order with this id holds the
    /// seller's products, `AuthError::InvalidTransition`, or
    /// `AuthError::Storage`.
    #[instrument(skip(self), fields(seller_id = %seller_id, order_id = %order_id, status = ?status))]
    pub async fn fulfil_order(
        &self,
        seller_id: &SellerId,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, AuthError> {
        if !status.is_fulfilment_step() {
            return Err(AuthError::StatusNotPermitted(status));
        }
        self.mutate(|users| {
            let order = users
                .values_mut()
                .filter(|u| u.role == UserRole::Buyer)
                .flat_map(|u| u.orders.iter_mut())
                .find(|o| &o.id == order_id && o.items.iter().any(|line| &line.product.seller_id == seller_id))
                .ok_or_else(|| AuthError::OrderNotFound(order_id.clone()))?;
            order.status = order.status.transition(status)?;
            Ok(order.clone())
        })
        .await
    }
}

/// Hash plain-text passwords left by older snapshots. Returns whether any changed.
fn upgrade_legacy_passwords(users: &mut Users) -> bool {
    let mut changed = false;
    for (email, user) in users.iter_mut() {
        let Some(plain) = user.password.take() else {
            continue;
        };
        if user.password_hash.is_some() {
            changed = true;
            continue;
        }
        match hash_password(&plain) {
            Ok(hash) => {
                user.password_hash = Some(hash);
                changed = true;
            }
            Err(e) => warn!(email = %email, error = %e, "Could not upgrade legacy password"),
        }
    }
    changed
}

/// Insert the demo accounts when missing. The demo buyer is also restored
/// when it has no orders. Returns whether anything was inserted.
fn seed_demo_users(users: &mut Users) -> bool {
    let mut changed = false;

    let buyer_missing = users
        .get(fixtures::DEMO_BUYER_EMAIL)
        .is_none_or(|u| u.orders.is_empty());
    if buyer_missing {
        match demo_user(fixtures::DEMO_BUYER_PASSWORD, UserRole::Buyer, "Demo User") {
            Some(mut buyer) => {
                buyer.sustainability_coins = fixtures::DEMO_BUYER_COINS;
                buyer.orders = fixtures::demo_orders();
                users.insert(fixtures::DEMO_BUYER_EMAIL.to_owned(), buyer);
                changed = true;
            }
            None => warn!("Could not seed demo buyer"),
        }
    }

    if !users.contains_key(fixtures::DEMO_SELLER_EMAIL) {
        match demo_user(fixtures::DEMO_SELLER_PASSWORD, UserRole::Seller, "Demo Seller") {
            Some(seller) => {
                users.insert(fixtures::DEMO_SELLER_EMAIL.to_owned(), seller);
                changed = true;
            }
            None => warn!("Could not seed demo seller"),
        }
    }

    changed
}

fn demo_user(password: &str, role: UserRole, name: &str) -> Option<StoredUser> {
    let password_hash = hash_password(password).ok()?;
    Some(StoredUser {
        password_hash: Some(password_hash),
        password: None,
        role,
        name: name.to_owned(),
        sustainability_coins: 0,
        orders: Vec::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kala_connect_core::Price;
    use serde_json::json;

    use super::*;
    use crate::storage::MemorySnapshotStorage;

    fn store() -> (Arc<MemorySnapshotStorage>, AuthStore) {
        let storage = Arc::new(MemorySnapshotStorage::new());
        (storage.clone(), AuthStore::new(storage))
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Meera".into(),
            address: "12 Lake Road".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411001".into(),
        }
    }

    #[tokio::test]
    async fn test_demo_users_are_seeded() {
        let (_, store) = store();
        let visitor = VisitorId::generate();

        let buyer = store
            .login(visitor, fixtures::DEMO_BUYER_EMAIL, fixtures::DEMO_BUYER_PASSWORD)
            .await
            .unwrap();
        assert_eq!(buyer.role, UserRole::Buyer);
        assert_eq!(buyer.orders.len(), 2);
        assert_eq!(buyer.orders[0].total, Price::from_whole(999));
        assert_eq!(buyer.orders[1].total, Price::from_whole(2998));

        let seller = store
            .login(visitor, fixtures::DEMO_SELLER_EMAIL, fixtures::DEMO_SELLER_PASSWORD)
            .await
            .unwrap();
        assert!(seller.is_seller());
    }

    #[tokio::test]
    async fn test_signup_login_logout() {
        let (_, store) = store();
        let visitor = VisitorId::generate();

        store
            .signup("Asha", "asha@example.com", "terracotta", UserRole::Buyer)
            .await
            .unwrap();
        assert!(store.current(visitor).await.unwrap().is_none());

        let err = store
            .signup("Asha", "asha@example.com", "terracotta", UserRole::Buyer)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));

        store.login(visitor, "asha@example.com", "terracotta").await.unwrap();
        let current = store.current(visitor).await.unwrap().unwrap();
        assert_eq!(current.name, "Asha");

        store.logout(visitor).await.unwrap();
        assert!(store.current(visitor).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_errors_are_uniform() {
        let (_, store) = store();
        let visitor = VisitorId::generate();
        let unknown = store.login(visitor, "nobody@example.com", "whatever1").await.unwrap_err();
        let wrong = store
            .login(visitor, fixtures::DEMO_BUYER_EMAIL, "wrong-password")
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(wrong.to_string(), "Invalid email or password.");
    }

    #[tokio::test]
    async fn test_pointer_to_deleted_account_reads_as_signed_out() {
        let (storage, store) = store();
        let visitor = VisitorId::generate();
        storage
            .save(&keys::auth(visitor), json!({"email": "gone@example.com"}))
            .await
            .unwrap();

        assert!(store.current(visitor).await.unwrap().is_none());
        assert!(storage.load(&keys::auth(visitor)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_plain_text_password_is_upgraded() {
        let (storage, store) = store();
        storage
            .save(
                keys::USERS,
                json!({
                    "old@example.com": {
                        "password": "legacy-pass",
                        "role": "user",
                        "name": "Old Timer",
                        "sustainabilityCoins": 5,
                        "orders": []
                    }
                }),
            )
            .await
            .unwrap();

        store
            .login(VisitorId::generate(), "old@example.com", "legacy-pass")
            .await
            .unwrap();

        let raw = storage.load(keys::USERS).await.unwrap().unwrap();
        let record = &raw["data"]["old@example.com"];
        assert!(record.get("password").is_none());
        assert!(record["passwordHash"].as_str().unwrap().starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_place_order_credits_points_and_is_newest_first() {
        let (_, store) = store();
        let email = Email::parse(fixtures::DEMO_BUYER_EMAIL).unwrap();
        let product = fixtures::products().into_iter().next().unwrap();
        let coins = product.sustainability_coins;

        let order = store
            .place_order(&email, vec![CartItem { product, quantity: 2 }], address())
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.points_earned, coins * 2);

        let user = store.user(&email).await.unwrap();
        assert_eq!(user.orders[0].id, order.id);
        assert_eq!(user.sustainability_coins, fixtures::DEMO_BUYER_COINS + coins * 2);
    }

    #[tokio::test]
    async fn test_order_status_transitions_are_validated() {
        let (_, store) = store();
        let email = Email::parse(fixtures::DEMO_BUYER_EMAIL).unwrap();
        let delivered = store.user(&email).await.unwrap().orders[1].clone();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let err = store
            .update_order_status(&email, &delivered.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidTransition(_)));

        let returned = store
            .update_order_status(&email, &delivered.id, OrderStatus::Returned)
            .await
            .unwrap();
        assert_eq!(returned.status, OrderStatus::Returned);
    }

    #[tokio::test]
    async fn test_buyer_cannot_ship_or_deliver() {
        let (_, store) = store();
        let email = Email::parse(fixtures::DEMO_BUYER_EMAIL).unwrap();
        let processing = store.user(&email).await.unwrap().orders[0].clone();
        assert_eq!(processing.status, OrderStatus::Processing);

        for status in [OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Processing] {
            let err = store
                .update_order_status(&email, &processing.id, status)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::StatusNotPermitted(s) if s == status));
        }

        let cancelled = store
            .update_order_status(&email, &processing.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_seller_fulfils_orders_with_own_products() {
        let (_, store) = store();
        let email = Email::parse(fixtures::DEMO_BUYER_EMAIL).unwrap();
        let order = store.user(&email).await.unwrap().orders[0].clone();
        let own = SellerId::new(fixtures::DASHBOARD_SELLER_ID);

        let err = store
            .fulfil_order(&own, &order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::StatusNotPermitted(_)));

        let err = store
            .fulfil_order(&SellerId::new("seller-3"), &order.id, OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::OrderNotFound(_)));

        let shipped = store.fulfil_order(&own, &order.id, OrderStatus::Shipped).await.unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        let delivered = store.fulfil_order(&own, &order.id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(store.user(&email).await.unwrap().orders[0].status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_update_and_delete_account() {
        let (_, store) = store();
        let visitor = VisitorId::generate();
        let user = store
            .signup("Ravi", "ravi@example.com", "block-print", UserRole::Seller)
            .await
            .unwrap();

        store
            .update_user(
                &user.email,
                ProfileUpdate {
                    name: Some("Ravi K".into()),
                    password: Some("new-password".into()),
                },
            )
            .await
            .unwrap();
        let relogged = store.login(visitor, "ravi@example.com", "new-password").await.unwrap();
        assert_eq!(relogged.name, "Ravi K");

        store.delete_account(visitor, &user.email).await.unwrap();
        assert!(store.user(&user.email).await.is_none());
        assert!(store.current(visitor).await.unwrap().is_none());
    }
}
