//! Marketplace product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{Identified, ProductId, SellerId};
use super::price::Price;

/// Seller information embedded in every product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerSummary {
    pub id: SellerId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub city: Option<String>,
}

/// A product listing as shown in feeds, search results and detail pages.
///
/// `is_liked` is never taken from the backend. It is recomputed from the
/// local favorites ledger whenever products are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    /// Price before discount, if the seller set one.
    pub original_price: Option<Price>,
    /// Image URLs in display order.
    pub images: Vec<String>,
    pub category: String,
    pub condition: String,
    pub stock: u32,
    /// Free-text location entered by the seller.
    pub location: String,
    pub created_at: Option<DateTime<Utc>>,
    pub seller: SellerSummary,
    pub is_liked: bool,
    pub is_promoted: bool,
    pub is_boosted: bool,
    pub is_featured: bool,
}

impl Product {
    /// Discount percentage to display, if any.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        self.price.discount_percent(self.original_price)
    }

    /// First image, used for thumbnails and favorites snapshots.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product belongs in the promoted strip.
    #[must_use]
    pub const fn is_highlighted(&self) -> bool {
        self.is_promoted || self.is_boosted || self.is_featured
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive substring match against an already lowercased needle.
    fn matches(&self, needle: &str) -> bool {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.seller.name.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Identified for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// Filter an already-fetched list by a free-text query.
///
/// Matches title, description, category and seller name, ignoring case.
/// A blank query returns every product.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }
    products.iter().filter(|p| p.matches(&needle)).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;

    use super::*;

    /// Build a product with sensible defaults for tests.
    #[allow(clippy::unwrap_used)]
    pub fn product(id: &str, title: &str) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            title: title.to_string(),
            description: String::new(),
            price: Price::new(Decimal::new(1500, 2)).unwrap(),
            original_price: None,
            images: vec![format!("https://cdn.example.com/{id}.jpg")],
            category: "misc".to_string(),
            condition: "new".to_string(),
            stock: 1,
            location: "Tunis".to_string(),
            created_at: None,
            seller: SellerSummary {
                id: SellerId::parse("seller-1").unwrap(),
                name: "Amira".to_string(),
                avatar_url: None,
                city: Some("Tunis".to_string()),
            },
            is_liked: false,
            is_promoted: false,
            is_boosted: false,
            is_featured: false,
        }
    }
}
