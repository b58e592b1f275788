//! Core types for Souk.
//!
//! This module provides type-safe wrappers and plain data for the
//! marketplace domain, plus the small list rules that go with them.

pub mod cache;
pub mod favorite;
pub mod geo;
pub mod history;
pub mod id;
pub mod price;
pub mod product;
pub mod search;
pub mod shop;

pub use cache::{CACHE_EXPIRY, CacheEnvelope};
pub use favorite::{FavoriteItem, Favorites};
pub use geo::{Coordinates, EARTH_RADIUS_KM, distance_km};
pub use history::{SEARCH_HISTORY_LIMIT, SearchHistory};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, SellerSummary, filter_products};
pub use search::{
    Autocomplete, FacetCount, PriceBounds, SearchFacets, SearchFilters, SearchPreferences, SortBy,
};
pub use shop::{Shop, ShopType, filter_shops, sort_by_distance};
