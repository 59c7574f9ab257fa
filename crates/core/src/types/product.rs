//! Catalog records: products, reviews and monthly sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, ReviewId, SellerId};
use super::price::Price;

/// A customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub author: String,
    /// Star rating, 1-5.
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// Review fields supplied by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub author: String,
    pub rating: u8,
    pub comment: String,
}

impl Review {
    /// Lowest accepted rating.
    pub const MIN_RATING: u8 = 1;
    /// Highest accepted rating.
    pub const MAX_RATING: u8 = 5;

    /// Build a review with a fresh id, dated now.
    #[must_use]
    pub fn from_draft(draft: ReviewDraft) -> Self {
        Self {
            id: ReviewId::generate(),
            author: draft.author,
            rating: draft.rating,
            comment: draft.comment,
            date: Utc::now(),
        }
    }
}

/// Units sold in one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSale {
    pub month: String,
    pub units_sold: u32,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    pub image: String,
    pub seller_id: SellerId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_context: Option<String>,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_ai_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Reward points earned per unit purchased.
    #[serde(default)]
    pub sustainability_coins: u32,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub sales: Vec<ProductSale>,
}

/// Product fields supplied by a seller when listing a new product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cultural_context: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sustainability_coins: u32,
    #[serde(default)]
    pub stock: u32,
}

impl Product {
    /// Build a seller-listed product from a draft.
    ///
    /// Listed products are marked AI-generated (the dashboard fills them from
    /// the listing generator) and get an image hint made of the first two
    /// words of the name.
    #[must_use]
    pub fn from_draft(draft: ProductDraft, image: String, seller_id: SellerId) -> Self {
        let data_ai_hint = image_hint(&draft.name);
        Self {
            id: ProductId::generate(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            original_price: draft.original_price,
            image,
            seller_id,
            tags: draft.tags,
            cultural_context: draft.cultural_context,
            ai_generated: true,
            data_ai_hint: Some(data_ai_hint),
            color: draft.color,
            sustainability_coins: draft.sustainability_coins,
            reviews: Vec::new(),
            stock: draft.stock,
            sales: Vec::new(),
        }
    }

    /// Mean star rating, if the product has any reviews.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        #[allow(clippy::cast_precision_loss)] // review counts are small
        Some(f64::from(sum) / self.reviews.len() as f64)
    }

    /// Units sold across every recorded month.
    #[must_use]
    pub fn units_sold(&self) -> u32 {
        self.sales.iter().map(|s| s.units_sold).sum()
    }

    /// Record `quantity` units sold in `month`, decrementing stock.
    ///
    /// Stock saturates at zero.
    pub fn record_sale(&mut self, quantity: u32, month: &str) {
        self.stock = self.stock.saturating_sub(quantity);
        if let Some(entry) = self.sales.iter_mut().find(|s| s.month == month) {
            entry.units_sold += quantity;
        } else {
            self.sales.push(ProductSale {
                month: month.to_owned(),
                units_sold: quantity,
            });
        }
    }
}

/// First two lowercase words of a product name.
fn image_hint(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Madhubani Silk Stole".to_string(),
            description: "Hand painted".to_string(),
            price: Price::from_whole(1499),
            original_price: None,
            tags: vec!["fashion".to_string()],
            cultural_context: None,
            color: None,
            sustainability_coins: 15,
            stock: 4,
        }
    }

    #[test]
    fn test_from_draft_sets_listing_fields() {
        let product = Product::from_draft(draft(), "data:image/png;base64,AA==".into(), "seller-1".into());
        assert!(product.id.as_str().starts_with("prod-"));
        assert!(product.ai_generated);
        assert_eq!(product.data_ai_hint.as_deref(), Some("madhubani silk"));
        assert_eq!(product.seller_id.as_str(), "seller-1");
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn test_record_sale_saturates_and_accumulates() {
        let mut product = Product::from_draft(draft(), String::new(), "seller-1".into());
        product.record_sale(3, "2025-10");
        product.record_sale(3, "2025-10");
        assert_eq!(product.stock, 0);
        assert_eq!(product.sales.len(), 1);
        assert_eq!(product.sales.first().map(|s| s.units_sold), Some(6));
    }

    #[test]
    fn test_average_rating() {
        let mut product = Product::from_draft(draft(), String::new(), "seller-1".into());
        assert!(product.average_rating().is_none());
        for rating in [5, 4] {
            product.reviews.push(Review::from_draft(ReviewDraft {
                author: "Asha".into(),
                rating,
                comment: "Lovely".into(),
            }));
        }
        assert_eq!(product.average_rating(), Some(4.5));
    }

    #[test]
    fn test_deserialize_minimal_legacy_product() {
        let json = r#"{
            "id": "prod-9",
            "name": "Clay Lamp",
            "description": "Diya",
            "price": 199,
            "image": "https://example.com/diya.jpg",
            "sellerId": "seller-2"
        }"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.stock, 0);
        assert!(product.tags.is_empty());
        assert!(!product.ai_generated);
    }
}
