//! Test doubles shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use souk_core::{
    Autocomplete, Price, Product, ProductId, SellerId, SellerSummary, Shop, ShopId, ShopType,
};

use crate::api::{
    ApiError, MarketplaceApi, NearbyQuery, ProductDetail, ProductPage, ProductQuery,
    PushRegistration, SearchPage, SearchRequest,
};
use crate::sync;

pub fn product(id: &str, title: &str) -> Product {
    Product {
        id: ProductId::parse(id).unwrap(),
        title: title.to_string(),
        description: String::new(),
        price: Price::new(Decimal::new(2000, 2)).unwrap(),
        original_price: None,
        images: vec![format!("https://cdn.example.com/{id}.jpg")],
        category: "home".to_string(),
        condition: "used".to_string(),
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

pub fn products(prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<Product> {
    range
        .map(|n| product(&format!("{prefix}{n}"), &format!("Item {n}")))
        .collect()
}

pub fn shop(id: i64, name: &str, lat: &str, lng: &str) -> Shop {
    Shop {
        id: ShopId::new(id),
        name: name.to_string(),
        logo_url: None,
        description: String::new(),
        city: "Tunis".to_string(),
        country: "TN".to_string(),
        latitude: lat.to_string(),
        longitude: lng.to_string(),
        shop_type: ShopType::Standard,
        distance_km: f64::NAN,
        verified: None,
    }
}

pub fn offline() -> ApiError {
    ApiError::Unsuccessful("offline".to_string())
}

#[derive(Default)]
struct FakeState {
    offline: bool,
    pages: HashMap<(Option<String>, u32), ProductPage>,
    details: HashMap<ProductId, ProductDetail>,
    shops: Vec<Shop>,
    search_pages: HashMap<u32, SearchPage>,
    suggestions: Autocomplete,
    calls: Vec<&'static str>,
    product_queries: Vec<ProductQuery>,
    searches: Vec<SearchRequest>,
    nearby: Vec<NearbyQuery>,
    registrations: Vec<PushRegistration>,
}

/// Scripted in-memory backend. Clones share state.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        sync::lock(&self.state).offline = offline;
    }

    pub fn set_page(&self, category: Option<&str>, page: u32, products: Vec<Product>, total_pages: u32) {
        sync::lock(&self.state).pages.insert(
            (category.map(str::to_string), page),
            ProductPage {
                products,
                total_pages,
            },
        );
    }

    pub fn set_detail(&self, detail: ProductDetail) {
        sync::lock(&self.state)
            .details
            .insert(detail.product.id.clone(), detail);
    }

    pub fn set_shops(&self, shops: Vec<Shop>) {
        sync::lock(&self.state).shops = shops;
    }

    pub fn set_search_page(&self, page: SearchPage) {
        sync::lock(&self.state).search_pages.insert(page.page, page);
    }

    pub fn set_suggestions(&self, suggestions: Autocomplete) {
        sync::lock(&self.state).suggestions = suggestions;
    }

    pub fn calls(&self, name: &str) -> usize {
        sync::lock(&self.state)
            .calls
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    pub fn product_queries(&self) -> Vec<ProductQuery> {
        sync::lock(&self.state).product_queries.clone()
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        sync::lock(&self.state).searches.clone()
    }

    pub fn nearby_queries(&self) -> Vec<NearbyQuery> {
        sync::lock(&self.state).nearby.clone()
    }

    pub fn registrations(&self) -> Vec<PushRegistration> {
        sync::lock(&self.state).registrations.clone()
    }

    fn enter(&self, name: &'static str) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = sync::lock(&self.state);
        state.calls.push(name);
        if state.offline {
            return Err(offline());
        }
        Ok(state)
    }
}

impl MarketplaceApi for FakeApi {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        sync::lock(&self.state).product_queries.push(query.clone());
        let state = self.enter("list_products")?;
        Ok(state
            .pages
            .get(&(query.category.clone(), query.page))
            .cloned()
            .unwrap_or_default())
    }

    async fn product_detail(&self, id: &ProductId) -> Result<ProductDetail, ApiError> {
        let state = self.enter("product_detail")?;
        state
            .details
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
    }

    async fn nearby_shops(&self, query: &NearbyQuery) -> Result<Vec<Shop>, ApiError> {
        sync::lock(&self.state).nearby.push(*query);
        let state = self.enter("nearby_shops")?;
        Ok(state.shops.clone())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ApiError> {
        sync::lock(&self.state).searches.push(request.clone());
        let state = self.enter("search")?;
        Ok(state
            .search_pages
            .get(&request.page)
            .cloned()
            .unwrap_or_default())
    }

    async fn autocomplete(&self, _query: &str) -> Result<Autocomplete, ApiError> {
        let state = self.enter("autocomplete")?;
        Ok(state.suggestions.clone())
    }

    async fn register_push_token(&self, registration: &PushRegistration) -> Result<(), ApiError> {
        let mut state = self.enter("register_push_token")?;
        state.registrations.push(registration.clone());
        Ok(())
    }
}
