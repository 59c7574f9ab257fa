//! Placed orders and order tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{self, CartItem};
use super::id::OrderId;
use super::price::Price;
use super::status::OrderStatus;

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingAddress {
    /// Names of any blank fields, in declaration order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// An order placed by a signed-in user.
///
/// Items are the cart snapshot at checkout time. After placement only
/// `status` ever changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub date: DateTime<Utc>,
    pub items: Vec<CartItem>,
    pub total: Price,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    /// Reward points credited to the buyer for this order.
    #[serde(rename = "sustainabilityCoinsEarned", default)]
    pub points_earned: u32,
}

impl Order {
    /// Build a new `Processing` order from cart lines.
    ///
    /// The total and points are always derived from `items`.
    #[must_use]
    pub fn place(items: Vec<CartItem>, shipping_address: ShippingAddress) -> Self {
        let total = cart::subtotal(&items);
        let points_earned = cart::reward_points(&items);
        Self {
            id: OrderId::generate(),
            date: Utc::now(),
            items,
            total,
            status: OrderStatus::Processing,
            shipping_address,
            points_earned,
        }
    }

    /// Progress steps for the tracking view.
    ///
    /// Orders on the delivery path get the three fixed steps with completion
    /// flags; cancelled and returned orders get a single terminal step.
    #[must_use]
    pub fn tracking_steps(&self) -> Vec<TrackingStep> {
        match self.status {
            OrderStatus::Cancelled => vec![TrackingStep::new(OrderStatus::Cancelled, "Order Cancelled", true)],
            OrderStatus::Returned => vec![TrackingStep::new(OrderStatus::Returned, "Order Returned", true)],
            current => {
                let reached = current.delivery_index().unwrap_or(0);
                OrderStatus::DELIVERY_PATH
                    .iter()
                    .enumerate()
                    .map(|(i, status)| TrackingStep::new(*status, step_label(*status), i <= reached))
                    .collect()
            }
        }
    }
}

const fn step_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Processing => "Order Confirmed",
        OrderStatus::Shipped => "Shipped",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Order Cancelled",
        OrderStatus::Returned => "Order Returned",
    }
}

/// One step of an order's journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStep {
    pub status: OrderStatus,
    pub label: String,
    pub completed: bool,
}

impl TrackingStep {
    fn new(status: OrderStatus, label: &str, completed: bool) -> Self {
        Self {
            status,
            label: label.to_owned(),
            completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::product::{Product, ProductDraft};

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Demo User".into(),
            address: "123 Test St".into(),
            city: "Testville".into(),
            state: "Testland".into(),
            pincode: "123456".into(),
        }
    }

    fn line(price: i64, coins: u32, quantity: u32) -> CartItem {
        let product = Product::from_draft(
            ProductDraft {
                name: "Brass Diya".into(),
                description: String::new(),
                price: Price::from_whole(price),
                original_price: None,
                tags: Vec::new(),
                cultural_context: None,
                color: None,
                sustainability_coins: coins,
                stock: 5,
            },
            String::new(),
            "seller-1".into(),
        );
        CartItem { product, quantity }
    }

    #[test]
    fn test_place_derives_total_and_points() {
        let order = Order::place(vec![line(999, 20, 1), line(1999, 30, 2)], address());
        assert_eq!(order.total, Price::from_whole(4997));
        assert_eq!(order.points_earned, 80);
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.id.as_str().starts_with("order-"));
    }

    #[test]
    fn test_tracking_steps_on_delivery_path() {
        let mut order = Order::place(vec![line(999, 20, 1)], address());
        order.status = OrderStatus::Shipped;
        let steps = order.tracking_steps();
        let completed: Vec<bool> = steps.iter().map(|s| s.completed).collect();
        assert_eq!(completed, vec![true, true, false]);
        assert_eq!(steps.first().map(|s| s.label.as_str()), Some("Order Confirmed"));
    }

    #[test]
    fn test_tracking_steps_for_terminal_status() {
        let mut order = Order::place(vec![line(999, 20, 1)], address());
        order.status = OrderStatus::Cancelled;
        let steps = order.tracking_steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps.first().map(|s| s.label.as_str()), Some("Order Cancelled"));
    }

    #[test]
    fn test_missing_address_fields() {
        let mut addr = address();
        assert!(addr.missing_fields().is_empty());
        addr.city = "  ".into();
        addr.pincode = String::new();
        assert_eq!(addr.missing_fields(), vec!["city", "pincode"]);
    }

    #[test]
    fn test_points_field_wire_name() {
        let order = Order::place(vec![line(999, 20, 1)], address());
        let value = serde_json::to_value(&order).expect("serialize");
        assert_eq!(value["sustainabilityCoinsEarned"], 20);
        assert_eq!(value["status"], "Processing");
        assert_eq!(value["shippingAddress"]["pincode"], "123456");
    }
}
