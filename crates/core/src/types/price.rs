//! Type-safe price representation using decimal arithmetic.
//!
//! All catalog prices are in Indian Rupees. Amounts are stored as
//! [`Decimal`] so cart and order totals never accumulate float error, but they
//! serialize as plain JSON numbers to stay compatible with stored snapshots.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rupee amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_whole(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_whole(999), Price::from_whole(1999).times(2)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_whole(4997));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Price::from_whole(999)).expect("serialize");
        assert_eq!(json, "999.0");

        let back: Price = serde_json::from_str("1999").expect("deserialize");
        assert_eq!(back, Price::from_whole(1999));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_whole(2998).to_string(), "₹2998");
        assert_eq!(Price::new(Decimal::new(49950, 2)).to_string(), "₹499.5");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_whole(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
    }
}
