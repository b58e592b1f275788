//! Wire format of backend responses.
//!
//! Every field is optional or defaulted: the backend omits fields freely and
//! validation happens in `conversions`, not during parsing.

use serde::{Deserialize, Serialize};

use super::ApiError;

/// Common envelope: `{ success, message?, ...payload }`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, rejecting `success: false`.
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::Unsuccessful(
                self.message
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            ))
        }
    }
}

/// A value the backend sends as either a JSON string or a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Empty payload for endpoints that only acknowledge.
#[derive(Debug, Default, Deserialize)]
pub struct Ack {}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireSeller {
    #[serde(alias = "_id")]
    pub id: Option<Scalar>,
    #[serde(alias = "fullName", alias = "username")]
    pub name: Option<String>,
    #[serde(alias = "avatarUrl", alias = "profileImage")]
    pub avatar: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub product_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireProduct {
    #[serde(alias = "_id")]
    pub id: Option<Scalar>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Scalar>,
    pub original_price: Option<Scalar>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub stock: Option<i64>,
    pub location: Option<String>,
    pub created_at: Option<String>,
    pub seller: Option<WireSeller>,
    pub is_liked: bool,
    pub is_promoted: bool,
    pub is_boosted: bool,
    pub is_featured: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireProductList {
    pub products: Vec<WireProduct>,
    pub total_pages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireProductDetail {
    pub product: Option<WireProduct>,
    pub seller: Option<WireSeller>,
    pub boutique: Option<WireShop>,
    pub similar_products: Vec<WireProduct>,
    pub same_seller_products: Vec<WireProduct>,
}

// =============================================================================
// Shops
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireShop {
    #[serde(alias = "_id")]
    pub id: Option<Scalar>,
    pub name: Option<String>,
    #[serde(alias = "logoUrl")]
    pub logo: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<Scalar>,
    pub longitude: Option<Scalar>,
    #[serde(alias = "type")]
    pub shop_type: Option<String>,
    #[serde(alias = "isVerified")]
    pub verified: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireShopList {
    pub shops: Vec<WireShop>,
}

// =============================================================================
// Search
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WirePagination {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireFacet {
    #[serde(alias = "_id", alias = "name")]
    pub value: Option<Scalar>,
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WirePriceRange {
    pub min: Option<Scalar>,
    pub max: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireFacets {
    pub categories: Vec<WireFacet>,
    pub conditions: Vec<WireFacet>,
    pub cities: Vec<WireFacet>,
    pub price_range: Option<WirePriceRange>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireSearchResults {
    pub products: Vec<WireProduct>,
    pub pagination: WirePagination,
    pub facets: WireFacets,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireSuggestions {
    pub products: Vec<String>,
    pub categories: Vec<String>,
    pub shops: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireAutocomplete {
    pub suggestions: WireSuggestions,
}

// =============================================================================
// Push
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePushToken<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub fcm_token: &'a str,
}
