//! Status enums for orders and accounts.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders start in `Processing`. The only permitted mutation of a placed
/// order is a status change along these edges:
///
/// ```text
/// Processing -> Shipped -> Delivered -> Returned
///      \
///       -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

/// Error returned for a status change that is not an edge of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move an order from {from} to {to}")]
pub struct InvalidTransition {
    /// Current status.
    pub from: OrderStatus,
    /// Requested status.
    pub to: OrderStatus,
}

impl OrderStatus {
    /// Statuses on the normal delivery path, in order.
    pub const DELIVERY_PATH: [Self; 3] = [Self::Processing, Self::Shipped, Self::Delivered];

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned)
    }

    /// Whether `self -> next` is a permitted transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
                | (Self::Delivered, Self::Returned)
        )
    }

    /// Statuses a buyer may request on their own order.
    #[must_use]
    pub const fn is_buyer_request(self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned)
    }

    /// Statuses only the seller fulfilling the order may set.
    #[must_use]
    pub const fn is_fulfilment_step(self) -> bool {
        matches!(self, Self::Shipped | Self::Delivered)
    }

    /// Validate a transition and return the new status.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] if `next` is not reachable from `self`.
    pub const fn transition(self, next: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Position on the delivery path, if the status is on it.
    #[must_use]
    pub fn delivery_index(self) -> Option<usize> {
        Self::DELIVERY_PATH.iter().position(|s| *s == self)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
        };
        f.write_str(s)
    }
}

/// Account role.
///
/// The wire names (`user`, `shopper`) are the ones persisted in the user
/// snapshot and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// A shopper browsing and buying products.
    #[serde(rename = "user")]
    Buyer,
    /// A seller with access to the dashboard.
    #[serde(rename = "shopper")]
    Seller,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "user"),
            Self::Seller => write!(f, "shopper"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "buyer" => Ok(Self::Buyer),
            "shopper" | "seller" => Ok(Self::Seller),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permitted_transitions() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Returned));
    }

    #[test]
    fn test_buyer_and_seller_steps_do_not_overlap() {
        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Returned,
        ] {
            assert!(!(status.is_buyer_request() && status.is_fulfilment_step()), "{status}");
        }
        assert!(OrderStatus::Cancelled.is_buyer_request());
        assert!(OrderStatus::Shipped.is_fulfilment_step());
        assert!(!OrderStatus::Processing.is_buyer_request());
        assert!(!OrderStatus::Processing.is_fulfilment_step());
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Processing));

        let err = OrderStatus::Cancelled
            .transition(OrderStatus::Shipped)
            .expect_err("terminal");
        assert_eq!(err.to_string(), "cannot move an order from Cancelled to Shipped");
    }

    #[test]
    fn test_terminal_statuses() {
        for status in [OrderStatus::Cancelled, OrderStatus::Returned] {
            assert!(status.is_terminal());
            assert!(status.delivery_index().is_none());
        }
        assert_eq!(OrderStatus::Delivered.delivery_index(), Some(2));
    }

    #[test]
    fn test_user_role_wire_names() {
        assert_eq!(serde_json::to_string(&UserRole::Buyer).expect("ser"), "\"user\"");
        assert_eq!(serde_json::to_string(&UserRole::Seller).expect("ser"), "\"shopper\"");
        assert_eq!("seller".parse::<UserRole>(), Ok(UserRole::Seller));
        assert!("admin".parse::<UserRole>().is_err());
    }
}
