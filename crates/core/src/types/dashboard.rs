//! Seller dashboard figures.
//!
//! Everything here is derived from the catalog's per-month sales and the
//! buyers' order histories; nothing is stored.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::{AuthUser, OrderStatus, Price, Product, SellerId, UserRole};

/// Months shown in the revenue chart.
pub const CHART_MONTHS: usize = 6;

/// Best sellers listed on the overview.
pub const TOP_PRODUCT_COUNT: usize = 3;

/// Products with fewer units than this (but not sold out) are flagged.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    #[serde(flatten)]
    pub product: Product,
    pub total_units_sold: u32,
}

/// One seller's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerOverview {
    pub total_revenue: Price,
    pub total_units_sold: u32,
    /// Oldest first, at most [`CHART_MONTHS`] entries.
    pub monthly_revenue: Vec<MonthlyRevenue>,
    /// Buyer orders still `Processing` that contain one of the seller's products.
    pub pending_orders: usize,
    pub top_products: Vec<TopProduct>,
    pub low_stock: Vec<Product>,
}

impl SellerOverview {
    /// Build the overview for `seller_id`.
    ///
    /// Revenue values each month's units at the product's current price.
    /// `catalog` may hold other sellers' products; they are ignored.
    #[must_use]
    pub fn compute(seller_id: &SellerId, catalog: &[Product], accounts: &[AuthUser]) -> Self {
        let own: Vec<&Product> = catalog.iter().filter(|p| &p.seller_id == seller_id).collect();

        let mut by_month: BTreeMap<&str, Price> = BTreeMap::new();
        for product in &own {
            for sale in &product.sales {
                let revenue = by_month.entry(sale.month.as_str()).or_default();
                *revenue = *revenue + product.price.times(sale.units_sold);
            }
        }
        let total_revenue = by_month.values().copied().sum();
        let skip = by_month.len().saturating_sub(CHART_MONTHS);
        let monthly_revenue = by_month
            .into_iter()
            .skip(skip)
            .map(|(month, revenue)| MonthlyRevenue {
                month: month.to_owned(),
                revenue,
            })
            .collect();

        let mut ranked: Vec<TopProduct> = own
            .iter()
            .map(|p| TopProduct {
                product: (*p).clone(),
                total_units_sold: p.units_sold(),
            })
            .collect();
        let total_units_sold = ranked.iter().map(|t| t.total_units_sold).sum();
        // Stable, so ties keep catalog order
        ranked.sort_by(|a, b| b.total_units_sold.cmp(&a.total_units_sold));
        ranked.truncate(TOP_PRODUCT_COUNT);

        let low_stock = own
            .iter()
            .filter(|p| p.stock > 0 && p.stock < LOW_STOCK_THRESHOLD)
            .map(|p| (*p).clone())
            .collect();

        let pending_orders = accounts
            .iter()
            .filter(|u| u.role == UserRole::Buyer)
            .flat_map(|u| &u.orders)
            .filter(|o| o.status == OrderStatus::Processing)
            .filter(|o| o.items.iter().any(|line| &line.product.seller_id == seller_id))
            .map(|o| &o.id)
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_revenue,
            total_units_sold,
            monthly_revenue,
            pending_orders,
            top_products: ranked,
            low_stock,
        }
    }
}
