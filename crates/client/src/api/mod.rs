//! Marketplace REST backend.
//!
//! # Architecture
//!
//! - [`MarketplaceApi`] is the seam components depend on; tests substitute a
//!   scripted fake
//! - [`HttpApiClient`] is the production implementation over `reqwest`
//! - Responses are parsed into lenient wire structs, checked for the
//!   `success` flag, then validated into `souk_core` types. List items that
//!   fail validation are skipped with a warning rather than failing the page
//! - Product detail responses are cached in memory via `moka` (5 minute TTL)
//!
//! # Endpoints
//!
//! - `GET products` - paginated feed, optional category
//! - `GET products/discover/product/{id}` - product detail
//! - `GET boutique/premium/discover/nearby` - shops around a coordinate
//! - `GET search/search` - remote search with filters and facets
//! - `GET search/autocomplete` - query suggestions
//! - `POST save-fcm-token` - push token registration

mod client;
mod conversions;
mod types;
mod wire;

use std::future::Future;

use souk_core::{Autocomplete, ProductId, Shop};
use thiserror::Error;

pub use client::HttpApiClient;
pub use types::{
    NearbyQuery, ProductDetail, ProductPage, ProductQuery, PushRegistration, SearchPage,
    SearchRequest, SellerProfile, ShopSummary,
};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend answered `success: false`.
    #[error("Request unsuccessful: {0}")]
    Unsuccessful(String),

    /// Response parsed but violates the expected contract.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Operations the client needs from the marketplace backend.
pub trait MarketplaceApi: Send + Sync {
    /// One page of the product feed.
    fn list_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductPage, ApiError>> + Send;

    /// Full detail for one product.
    fn product_detail(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<ProductDetail, ApiError>> + Send;

    /// Shops within a radius of a coordinate.
    fn nearby_shops(
        &self,
        query: &NearbyQuery,
    ) -> impl Future<Output = Result<Vec<Shop>, ApiError>> + Send;

    /// One page of remote search results.
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchPage, ApiError>> + Send;

    /// Suggestions for a partial query.
    fn autocomplete(&self, query: &str)
    -> impl Future<Output = Result<Autocomplete, ApiError>> + Send;

    /// Register a messaging token for push notifications.
    fn register_push_token(
        &self,
        registration: &PushRegistration,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
