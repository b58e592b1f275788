//! Remote search request and result types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::Price;

/// Result ordering accepted by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortBy {
    /// Value for the `sort_by` query parameter.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    /// Parse a `sort_by` value; unknown values yield `None`.
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "relevance" => Some(Self::Relevance),
            "newest" => Some(Self::Newest),
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            _ => None,
        }
    }
}

/// Optional filters narrowing a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub condition: Option<String>,
    pub city: Option<String>,
}

impl SearchFilters {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.condition.is_none()
            && self.city.is_none()
    }

    /// Query parameters for the set filters, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        if let Some(condition) = &self.condition {
            pairs.push(("condition", condition.clone()));
        }
        if let Some(city) = &self.city {
            pairs.push(("city", city.clone()));
        }
        pairs
    }
}

/// Last-used search settings, restored when a search session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPreferences {
    pub filters: SearchFilters,
    pub sort_by: SortBy,
}

/// One facet bucket, e.g. a category and how many results fall in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Lowest and highest price among the matching results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: Price,
    pub max: Price,
}

/// Facets returned alongside search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFacets {
    pub categories: Vec<FacetCount>,
    pub conditions: Vec<FacetCount>,
    pub cities: Vec<FacetCount>,
    pub price_range: Option<PriceBounds>,
}

/// Autocomplete suggestions for a partial query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autocomplete {
    pub products: Vec<String>,
    pub categories: Vec<String>,
    pub shops: Vec<String>,
}

impl Autocomplete {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty() && self.shops.is_empty()
    }
}
