use serde::{Deserialize, Serialize};

use super::id::SellerId;

/// An artisan storefront profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub story: String,
    pub logo: String,
    pub craftswoman_name: String,
    pub background: String,
    pub cover_image: String,
    #[serde(default)]
    pub logo_data_ai_hint: String,
    #[serde(default)]
    pub cover_data_ai_hint: String,
}
