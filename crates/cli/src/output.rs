//! Plain-text rendering of command results to stdout.
//!
//! Diagnostics go through `tracing` to stderr; only results are printed here.

#![allow(clippy::print_stdout)]

use chrono::DateTime;
use souk_client::api::ProductDetail;
use souk_core::{
    Autocomplete, Coordinates, FacetCount, Favorites, Product, SearchFacets, SearchPreferences,
    Shop,
};

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    for product in products {
        println!("{}", product_line(product));
    }
}

fn product_line(product: &Product) -> String {
    let liked = if product.is_liked { "*" } else { " " };
    let discount = product
        .discount_percent()
        .map(|pct| format!(" (-{pct}%)"))
        .unwrap_or_default();
    let stock = if product.in_stock() { "" } else { " [sold out]" };
    format!(
        "{liked} {:<26} {:>10}{discount}  {}  by {}{stock}",
        product.id.to_string(),
        product.price.to_string(),
        product.title,
        product.seller.name
    )
}

pub fn more_available(has_more: bool) {
    if has_more {
        println!("(more available, use --pages)");
    }
}

pub fn product_detail(detail: &ProductDetail) {
    let product = &detail.product;
    println!("{}", product.title);
    println!("  ID:        {}", product.id);
    match product.original_price {
        Some(original) if product.discount_percent().is_some() => {
            println!("  Price:     {} (was {original})", product.price);
        }
        _ => println!("  Price:     {}", product.price),
    }
    println!("  Category:  {}", product.category);
    println!("  Condition: {}", product.condition);
    println!("  Stock:     {}", product.stock);
    if !product.location.is_empty() {
        println!("  Location:  {}", product.location);
    }
    if product.is_liked {
        println!("  In your favorites");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }

    if let Some(seller) = &detail.seller {
        println!();
        let city = seller.city.as_deref().unwrap_or("-");
        println!("Seller: {} ({city})", seller.name);
        if let Some(count) = seller.product_count {
            println!("  {count} listings");
        }
    }
    if let Some(shop) = &detail.shop {
        let verified = if shop.verified { " [verified]" } else { "" };
        println!("Shop:   {}{verified}", shop.name);
    }

    related("Similar products", &detail.similar);
    related("More from this seller", &detail.same_seller);
}

fn related(heading: &str, products: &[Product]) {
    if products.is_empty() {
        return;
    }
    println!();
    println!("{heading}:");
    for product in products {
        println!("{}", product_line(product));
    }
}

pub fn shops(origin: Coordinates, shops: &[Shop]) {
    println!("Shops near {:.4}, {:.4}:", origin.latitude, origin.longitude);
    if shops.is_empty() {
        println!("No shops.");
        return;
    }
    for shop in shops {
        let distance = if shop.distance_km.is_finite() {
            format!("{:>8.1} km", shop.distance_km)
        } else {
            format!("{:>11}", "?")
        };
        let verified = if shop.is_verified() { " [verified]" } else { "" };
        println!("{distance}  {}  ({}){verified}", shop.name, shop.city);
    }
}

pub fn search_summary(query: &str, total: u64, preferences: &SearchPreferences) {
    println!(
        "{total} results for \"{query}\" sorted by {}",
        preferences.sort_by.as_param()
    );
    let filters = preferences.filters.query_pairs();
    if !filters.is_empty() {
        let rendered: Vec<String> = filters.iter().map(|(k, v)| format!("{k}={v}")).collect();
        println!("Filters: {}", rendered.join(", "));
    }
}

pub fn facets(facets: &SearchFacets) {
    facet_line("Categories", &facets.categories);
    facet_line("Conditions", &facets.conditions);
    facet_line("Cities", &facets.cities);
    if let Some(bounds) = facets.price_range {
        println!("Prices: {} - {}", bounds.min, bounds.max);
    }
}

fn facet_line(label: &str, counts: &[FacetCount]) {
    if counts.is_empty() {
        return;
    }
    let rendered: Vec<String> = counts
        .iter()
        .map(|facet| format!("{} ({})", facet.value, facet.count))
        .collect();
    println!("{label}: {}", rendered.join(", "));
}

pub fn suggestions(suggestions: &Autocomplete) {
    if suggestions.is_empty() {
        println!("No suggestions.");
        return;
    }
    for (label, values) in [
        ("Products", &suggestions.products),
        ("Categories", &suggestions.categories),
        ("Shops", &suggestions.shops),
    ] {
        if !values.is_empty() {
            println!("{label}: {}", values.join(", "));
        }
    }
}

pub fn favorites(favorites: &Favorites) {
    if favorites.is_empty() {
        println!("No favorites.");
        return;
    }
    for item in favorites.iter() {
        let added = DateTime::from_timestamp_millis(item.added_at)
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:<26} {:>10}  {}  by {}  {added}",
            item.id.to_string(),
            item.price.to_string(),
            item.title,
            item.seller_name
        );
    }
}

pub fn history(entries: &[String]) {
    if entries.is_empty() {
        println!("No recent searches.");
        return;
    }
    for (index, query) in entries.iter().enumerate() {
        println!("{:>2}. {query}", index + 1);
    }
}

pub fn distance(km: f64) {
    println!("{km:.3} km");
}
