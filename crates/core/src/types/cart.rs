//! Cart lines and cart arithmetic.
//!
//! A cart line is a snapshot of the product taken when it was added, plus a
//! quantity. Lines are not re-priced when the catalog changes. The functions
//! here are shared by the per-visitor cart, the shared cart and checkout so
//! totals are computed identically everywhere.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// A product snapshot plus quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line (`price x quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// Reward points earned by this line.
    #[must_use]
    pub const fn line_points(&self) -> u32 {
        self.product.sustainability_coins.saturating_mul(self.quantity)
    }
}

/// Computed totals for a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Price,
    /// Equal to the subtotal: no tax or shipping is modeled.
    pub total: Price,
    pub item_count: u32,
    pub reward_points: u32,
}

impl CartSummary {
    /// Summarize the given lines.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        let subtotal = subtotal(items);
        Self {
            subtotal,
            total: subtotal,
            item_count: item_count(items),
            reward_points: reward_points(items),
        }
    }
}

/// Sum of `price x quantity` over all lines.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> Price {
    items.iter().map(CartItem::line_total).sum()
}

/// Total number of units across all lines.
#[must_use]
pub fn item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|i| i.quantity).sum()
}

/// Sum of `reward points x quantity` over all lines.
#[must_use]
pub fn reward_points(items: &[CartItem]) -> u32 {
    items.iter().map(CartItem::line_points).sum()
}

/// Add `quantity` units of `product`.
///
/// An existing line for the same product has its quantity incremented; a new
/// line is only appended when the product is not in the cart yet. Adding zero
/// units is a no-op.
pub fn add_item(items: &mut Vec<CartItem>, product: Product, quantity: u32) {
    if quantity == 0 {
        return;
    }
    if let Some(line) = items.iter_mut().find(|i| i.product.id == product.id) {
        line.quantity = line.quantity.saturating_add(quantity);
    } else {
        items.push(CartItem { product, quantity });
    }
}

/// Set the quantity of a line. A quantity of zero removes the line.
///
/// Returns `false` if the product is not in the cart.
pub fn set_quantity(items: &mut Vec<CartItem>, product_id: &ProductId, quantity: u32) -> bool {
    if quantity == 0 {
        return remove_item(items, product_id);
    }
    match items.iter_mut().find(|i| &i.product.id == product_id) {
        Some(line) => {
            line.quantity = quantity;
            true
        }
        None => false,
    }
}

/// Remove the line for `product_id`. Returns `false` if it was not present.
pub fn remove_item(items: &mut Vec<CartItem>, product_id: &ProductId) -> bool {
    let before = items.len();
    items.retain(|i| &i.product.id != product_id);
    items.len() != before
}
