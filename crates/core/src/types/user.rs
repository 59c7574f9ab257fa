//! Signed-in user profile.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::order::Order;
use super::status::UserRole;

/// The public view of an account: everything except credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub email: Email,
    pub role: UserRole,
    pub name: String,
    /// Reward-point balance.
    #[serde(default)]
    pub sustainability_coins: u32,
    /// Orders, newest first.
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl AuthUser {
    /// Whether the account has seller privileges.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.role == UserRole::Seller
    }
}
