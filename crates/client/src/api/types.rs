//! Request and response types for [`super::MarketplaceApi`].

use secrecy::SecretString;
use souk_core::{
    Coordinates, Product, SearchFacets, SearchFilters, SellerId, ShopId, SortBy, UserId,
};

/// Parameters for one page of the product feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
}

/// One page of products plus the server's page count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: u32,
}

/// Public seller profile shown on the product detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerProfile {
    pub id: SellerId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub product_count: Option<u32>,
}

/// The shop a product is listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSummary {
    pub id: ShopId,
    pub name: String,
    pub logo_url: Option<String>,
    pub city: Option<String>,
    pub verified: bool,
}

/// Product detail with related listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub product: Product,
    pub seller: Option<SellerProfile>,
    pub shop: Option<ShopSummary>,
    pub similar: Vec<Product>,
    pub same_seller: Vec<Product>,
}

impl ProductDetail {
    /// Every product embedded in the detail, for bulk flag updates.
    pub fn products_mut(&mut self) -> impl Iterator<Item = &mut Product> {
        std::iter::once(&mut self.product)
            .chain(self.similar.iter_mut())
            .chain(self.same_seller.iter_mut())
    }
}

/// Parameters for the nearby shops query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub origin: Coordinates,
    pub radius_km: f64,
}

/// A remote search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortBy,
    pub filters: SearchFilters,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub products: Vec<Product>,
    pub page: u32,
    pub total: u64,
    pub total_pages: u32,
    pub facets: SearchFacets,
}

/// A push token registration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct PushRegistration {
    pub user_id: Option<UserId>,
    pub token: SecretString,
}

impl std::fmt::Debug for PushRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushRegistration")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
