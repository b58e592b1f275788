//! Product detail against the fake backend.
//!
//! Run with: cargo test -p souk-integration-tests --test product_detail

use axum::http::StatusCode;
use serde_json::json;
use souk_client::ClientError;
use souk_client::api::ApiError;
use souk_client::loader::LoadOutcome;
use souk_client::scope::ViewScope;
use souk_core::ProductId;
use souk_integration_tests::{FakeBackend, product_json};

fn detail_body() -> serde_json::Value {
    json!({
        "success": true,
        "product": product_json("lamp-1", "Brass lamp", "45.5"),
        "seller": {
            "_id": "seller-1",
            "fullName": "Amira",
            "city": "Tunis",
            "productCount": 12
        },
        "boutique": { "id": 7, "name": "Dar Amira", "city": "Tunis", "isVerified": true },
        "similarProducts": [product_json("lamp-2", "Copper lamp", "60")],
        "sameSellerProducts": [
            product_json("rug-1", "Kilim rug", "120"),
            { "_id": "broken", "title": "No price or seller" }
        ]
    })
}

#[tokio::test]
async fn test_detail_includes_seller_shop_and_related() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond("products/discover/product/lamp-1", detail_body());
    let state = backend.client(&[]).await.expect("Failed to build client");

    let id = ProductId::parse("lamp-1").expect("valid id");
    let detail = state.product_details().fetch(&id).await.expect("Fetch failed");

    assert_eq!(detail.product.title, "Brass lamp");
    assert_eq!(detail.product.price.to_string(), "45.50");
    assert_eq!(detail.seller.as_ref().map(|s| s.product_count), Some(Some(12)));
    assert_eq!(detail.shop.as_ref().map(|s| s.name.as_str()), Some("Dar Amira"));
    assert_eq!(detail.similar.len(), 1);
    // Invalid related products are dropped, not fatal
    assert_eq!(detail.same_seller.len(), 1);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond_with(
        "products/discover/product/gone",
        StatusCode::NOT_FOUND,
        json!({ "success": false, "message": "Product not found" }),
    );
    let state = backend.client(&[]).await.expect("Failed to build client");

    let id = ProductId::parse("gone").expect("valid id");
    let err = state
        .product_details()
        .fetch(&id)
        .await
        .expect_err("Missing product should fail");

    assert!(matches!(err, ClientError::Api(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_detail_is_memoized_and_liked_flags_stay_current() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond("products/discover/product/lamp-1", detail_body());
    let state = backend.client(&[]).await.expect("Failed to build client");

    let id = ProductId::parse("lamp-1").expect("valid id");
    let details = state.product_details();
    let scope = ViewScope::new();

    assert_eq!(details.open(&id, &scope).await, LoadOutcome::Fresh);
    assert_eq!(details.toggle_favorite().await.expect("toggle failed"), Some(true));

    // A second screen for the same product is served from memory
    let again = state.product_details();
    let detail = again.fetch(&id).await.expect("Fetch failed");
    assert!(detail.product.is_liked);
    assert_eq!(backend.requests_to("products/discover/product/lamp-1").len(), 1);
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_an_error() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond(
        "products/discover/product/lamp-1",
        json!({ "success": false, "message": "Listing suspended" }),
    );
    let state = backend.client(&[]).await.expect("Failed to build client");

    let id = ProductId::parse("lamp-1").expect("valid id");
    let err = state
        .product_details()
        .fetch(&id)
        .await
        .expect_err("Unsuccessful response should fail");

    assert_eq!(err.to_string(), "API error: Request unsuccessful: Listing suspended");
}
