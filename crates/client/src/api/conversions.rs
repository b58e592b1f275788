//! Validation of wire structs into domain types.
//!
//! Single items convert with `Result`; lists drop invalid items with a
//! warning so one bad record does not blank a whole screen.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use souk_core::{
    Autocomplete, FacetCount, Price, PriceBounds, Product, ProductId, SearchFacets, SellerId,
    SellerSummary, Shop, ShopId, ShopType,
};
use tracing::warn;

use super::ApiError;
use super::types::{ProductDetail, SearchPage, SellerProfile, ShopSummary};
use super::wire::{
    Scalar, WireAutocomplete, WireFacet, WireFacets, WireProduct, WireProductDetail,
    WireSearchResults, WireSeller, WireShop,
};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_decimal(value: Scalar) -> Option<Decimal> {
    let text = value.into_text();
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn parse_price(value: Option<Scalar>) -> Option<Price> {
    parse_decimal(value?).and_then(|d| Price::new(d).ok())
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value?.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_shop_id(value: Option<Scalar>) -> Option<ShopId> {
    value?.into_text().trim().parse::<i64>().ok().map(ShopId::new)
}

fn convert_list<W, T>(items: Vec<W>, kind: &str, convert: fn(W) -> Result<T, ApiError>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match convert(item) {
            Ok(converted) => Some(converted),
            Err(e) => {
                warn!(kind, error = %e, "Skipping invalid item from backend");
                None
            }
        })
        .collect()
}

// =============================================================================
// Products
// =============================================================================

fn convert_seller_summary(wire: WireSeller) -> Result<SellerSummary, ApiError> {
    let id = wire
        .id
        .map(Scalar::into_text)
        .ok_or_else(|| ApiError::Contract("seller has no id".to_string()))?;
    Ok(SellerSummary {
        id: SellerId::parse(&id).map_err(|e| ApiError::Contract(e.to_string()))?,
        name: non_blank(wire.name).unwrap_or_default(),
        avatar_url: non_blank(wire.avatar),
        city: non_blank(wire.city),
    })
}

/// Validate one product.
pub fn convert_product(wire: WireProduct) -> Result<Product, ApiError> {
    let id = wire
        .id
        .map(Scalar::into_text)
        .ok_or_else(|| ApiError::Contract("product has no id".to_string()))?;
    let id = ProductId::parse(&id).map_err(|e| ApiError::Contract(e.to_string()))?;

    let title = non_blank(wire.title)
        .ok_or_else(|| ApiError::Contract(format!("product {id} has no title")))?;
    let price = parse_price(wire.price)
        .ok_or_else(|| ApiError::Contract(format!("product {id} has no valid price")))?;
    let seller = wire
        .seller
        .ok_or_else(|| ApiError::Contract(format!("product {id} has no seller")))
        .and_then(convert_seller_summary)?;

    Ok(Product {
        title,
        description: wire.description.unwrap_or_default(),
        price,
        original_price: parse_price(wire.original_price),
        images: wire
            .images
            .into_iter()
            .filter(|url| !url.trim().is_empty())
            .collect(),
        category: non_blank(wire.category).unwrap_or_default(),
        condition: non_blank(wire.condition).unwrap_or_default(),
        stock: wire
            .stock
            .map_or(0, |s| u32::try_from(s.max(0)).unwrap_or(u32::MAX)),
        location: non_blank(wire.location).unwrap_or_default(),
        created_at: parse_timestamp(wire.created_at.as_deref()),
        seller,
        is_liked: wire.is_liked,
        is_promoted: wire.is_promoted,
        is_boosted: wire.is_boosted,
        is_featured: wire.is_featured,
        id,
    })
}

/// Validate a list of products, skipping invalid entries.
pub fn convert_products(wire: Vec<WireProduct>) -> Vec<Product> {
    convert_list(wire, "product", convert_product)
}

fn convert_seller_profile(wire: WireSeller) -> Result<SellerProfile, ApiError> {
    let bio = non_blank(wire.bio.clone());
    let product_count = wire.product_count;
    let summary = convert_seller_summary(wire)?;
    Ok(SellerProfile {
        id: summary.id,
        name: summary.name,
        avatar_url: summary.avatar_url,
        city: summary.city,
        bio,
        product_count,
    })
}

fn convert_shop_summary(wire: WireShop) -> Result<ShopSummary, ApiError> {
    let id = parse_shop_id(wire.id)
        .ok_or_else(|| ApiError::Contract("shop has no numeric id".to_string()))?;
    Ok(ShopSummary {
        id,
        name: non_blank(wire.name).unwrap_or_default(),
        logo_url: non_blank(wire.logo),
        city: non_blank(wire.city),
        verified: wire.verified.unwrap_or(false),
    })
}

/// Validate a product detail response.
///
/// The product itself is required. A malformed seller or shop block is
/// dropped rather than failing the whole detail.
pub fn convert_product_detail(wire: WireProductDetail) -> Result<ProductDetail, ApiError> {
    let product = wire
        .product
        .ok_or_else(|| ApiError::Contract("detail response has no product".to_string()))
        .and_then(convert_product)?;

    let seller = wire.seller.and_then(|s| {
        convert_seller_profile(s)
            .inspect_err(|e| warn!(error = %e, "Ignoring invalid seller profile"))
            .ok()
    });
    let shop = wire.boutique.and_then(|s| {
        convert_shop_summary(s)
            .inspect_err(|e| warn!(error = %e, "Ignoring invalid shop summary"))
            .ok()
    });

    Ok(ProductDetail {
        product,
        seller,
        shop,
        similar: convert_products(wire.similar_products),
        same_seller: convert_products(wire.same_seller_products),
    })
}

// =============================================================================
// Shops
// =============================================================================

/// Validate one shop. Coordinates are kept as sent; bad ones give NaN
/// distances later rather than rejecting the shop.
pub fn convert_shop(wire: WireShop) -> Result<Shop, ApiError> {
    let id = parse_shop_id(wire.id)
        .ok_or_else(|| ApiError::Contract("shop has no numeric id".to_string()))?;
    let name =
        non_blank(wire.name).ok_or_else(|| ApiError::Contract(format!("shop {id} has no name")))?;

    Ok(Shop {
        id,
        name,
        logo_url: non_blank(wire.logo),
        description: wire.description.unwrap_or_default(),
        city: non_blank(wire.city).unwrap_or_default(),
        country: non_blank(wire.country).unwrap_or_default(),
        latitude: wire.latitude.map(Scalar::into_text).unwrap_or_default(),
        longitude: wire.longitude.map(Scalar::into_text).unwrap_or_default(),
        shop_type: ShopType::from_tag(wire.shop_type.as_deref().unwrap_or_default()),
        distance_km: f64::NAN,
        verified: wire.verified,
    })
}

/// Validate a list of shops, skipping invalid entries.
pub fn convert_shops(wire: Vec<WireShop>) -> Vec<Shop> {
    convert_list(wire, "shop", convert_shop)
}

// =============================================================================
// Search
// =============================================================================

fn convert_facets_list(wire: Vec<WireFacet>) -> Vec<FacetCount> {
    wire.into_iter()
        .filter_map(|f| {
            let value = non_blank(f.value.map(Scalar::into_text))?;
            Some(FacetCount {
                value,
                count: f.count,
            })
        })
        .collect()
}

fn convert_facets(wire: WireFacets) -> SearchFacets {
    let price_range = wire.price_range.and_then(|range| {
        let min = parse_price(range.min)?;
        let max = parse_price(range.max)?;
        (min <= max).then_some(PriceBounds { min, max })
    });

    SearchFacets {
        categories: convert_facets_list(wire.categories),
        conditions: convert_facets_list(wire.conditions),
        cities: convert_facets_list(wire.cities),
        price_range,
    }
}

/// Convert a search response. `requested_page` fills in a missing
/// pagination block.
pub fn convert_search_results(wire: WireSearchResults, requested_page: u32) -> SearchPage {
    let products = convert_products(wire.products);
    let total = wire
        .pagination
        .total
        .unwrap_or_else(|| u64::try_from(products.len()).unwrap_or(u64::MAX));

    SearchPage {
        page: wire.pagination.page.unwrap_or(requested_page),
        total,
        total_pages: wire.pagination.total_pages.unwrap_or(requested_page),
        facets: convert_facets(wire.facets),
        products,
    }
}

/// Convert autocomplete suggestions, dropping blanks.
pub fn convert_autocomplete(wire: WireAutocomplete) -> Autocomplete {
    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .filter_map(|s| non_blank(Some(s)))
            .collect()
    };
    Autocomplete {
        products: clean(wire.suggestions.products),
        categories: clean(wire.suggestions.categories),
        shops: clean(wire.suggestions.shops),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wire_product(json: serde_json::Value) -> WireProduct {
        serde_json::from_value(json).unwrap()
    }

    fn valid_product_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "title": "Brass lamp",
            "price": "45.00",
            "originalPrice": 60,
            "images": ["https://cdn.example.com/lamp.jpg", " "],
            "stock": -3,
            "createdAt": "2026-03-01T10:00:00Z",
            "seller": { "_id": "s1", "fullName": "Amira" }
        })
    }

    #[test]
    fn test_convert_valid_product() {
        let product = convert_product(wire_product(valid_product_json("p1"))).unwrap();

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price.to_string(), "45.00");
        assert_eq!(product.discount_percent(), Some(25));
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.stock, 0);
        assert!(product.created_at.is_some());
        assert_eq!(product.seller.name, "Amira");
    }

    #[test]
    fn test_product_without_price_rejected() {
        let mut json = valid_product_json("p1");
        json["price"] = serde_json::json!("free");
        let err = convert_product(wire_product(json)).unwrap_err();
        assert!(matches!(err, ApiError::Contract(_)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut json = valid_product_json("p1");
        json["price"] = serde_json::json!(-5);
        assert!(convert_product(wire_product(json)).is_err());
    }

    #[test]
    fn test_bad_timestamp_is_none() {
        let mut json = valid_product_json("p1");
        json["createdAt"] = serde_json::json!("yesterday");
        let product = convert_product(wire_product(json)).unwrap();
        assert!(product.created_at.is_none());
    }

    #[test]
    fn test_list_skips_invalid_items() {
        let items = vec![
            wire_product(valid_product_json("p1")),
            wire_product(serde_json::json!({ "_id": "p2" })),
            wire_product(valid_product_json("p3")),
        ];
        let ids: Vec<_> = convert_products(items)
            .into_iter()
            .map(|p| p.id.into_inner())
            .collect();
        assert_eq!(ids, ["p1", "p3"]);
    }

    #[test]
    fn test_shop_keeps_unparsable_coordinates() {
        let wire: WireShop = serde_json::from_value(serde_json::json!({
            "_id": "12", "name": "Dar Lella", "latitude": "n/a", "longitude": 10.7, "type": "premium"
        }))
        .unwrap();
        let shop = convert_shop(wire).unwrap();

        assert_eq!(shop.id, ShopId::new(12));
        assert_eq!(shop.shop_type, ShopType::Premium);
        assert!(shop.coordinates().latitude.is_nan());
    }

    #[test]
    fn test_detail_tolerates_bad_seller_block() {
        let wire: WireProductDetail = serde_json::from_value(serde_json::json!({
            "product": valid_product_json("p1"),
            "seller": { "name": "no id" },
            "boutique": { "id": 3, "name": "Medina Goods", "verified": true },
            "similarProducts": [valid_product_json("p2")]
        }))
        .unwrap();
        let detail = convert_product_detail(wire).unwrap();

        assert!(detail.seller.is_none());
        assert_eq!(detail.shop.as_ref().map(|s| s.verified), Some(true));
        assert_eq!(detail.similar.len(), 1);
        assert!(detail.same_seller.is_empty());
    }

    #[test]
    fn test_search_facets_converted() {
        let wire: WireSearchResults = serde_json::from_value(serde_json::json!({
            "products": [valid_product_json("p1")],
            "pagination": { "page": 2, "limit": 10, "total": 31, "totalPages": 4 },
            "facets": {
                "categories": [{ "_id": "lighting", "count": 5 }, { "_id": "", "count": 1 }],
                "priceRange": { "min": 5, "max": "120.5" }
            }
        }))
        .unwrap();
        let page = convert_search_results(wire, 2);

        assert_eq!(page.total_pages, 4);
        assert_eq!(page.total, 31);
        assert_eq!(page.facets.categories.len(), 1);
        assert_eq!(page.facets.categories[0].value, "lighting");
        assert_eq!(
            page.facets.price_range.map(|r| r.max.to_string()),
            Some("120.50".to_string())
        );
    }
}
