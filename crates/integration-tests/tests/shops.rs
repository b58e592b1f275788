//! Nearby shops against the fake backend.
//!
//! Run with: cargo test -p souk-integration-tests --test shops

use serde_json::json;
use souk_client::loader::LoadOutcome;
use souk_client::location::{DeniedLocation, FixedLocation};
use souk_client::scope::ViewScope;
use souk_core::Coordinates;
use souk_integration_tests::{FakeBackend, shop_json};

fn shops_body() -> serde_json::Value {
    json!({
        "success": true,
        "shops": [
            shop_json(1, "Sousse Crafts", 35.8256, 10.6084),
            shop_json(2, "Medina Rugs", 36.7985, 10.1710),
            { "id": 3, "name": "Nowhere Goods", "latitude": "n/a", "longitude": "" },
            shop_json(4, "La Marsa Ceramics", 36.8782, 10.3247)
        ]
    })
}

#[tokio::test]
async fn test_shops_sorted_by_distance_from_device() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond("boutique/premium/discover/nearby", shops_body());
    let state = backend.client(&[]).await.expect("Failed to build client");

    let origin = Coordinates::new(36.8065, 10.1815);
    let nearby = state.nearby_shops(FixedLocation(origin));
    assert_eq!(nearby.refresh(&ViewScope::new()).await, LoadOutcome::Fresh);

    let names: Vec<String> = nearby.shops().into_iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec!["Medina Rugs", "La Marsa Ceramics", "Sousse Crafts", "Nowhere Goods"]
    );
    let first = nearby.shops().into_iter().next().expect("No shops");
    assert!(first.distance_km < 2.0);

    let requests = backend.requests_to("boutique/premium/discover/nearby");
    let request = requests.first().expect("No request recorded");
    assert_eq!(request.param("latitude"), Some("36.8065"));
    assert_eq!(request.param("longitude"), Some("10.1815"));
    assert_eq!(request.param("radius"), Some("50"));
}

#[tokio::test]
async fn test_denied_location_uses_configured_fallback() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond("boutique/premium/discover/nearby", shops_body());
    let state = backend
        .client(&[
            ("SOUK_DEFAULT_LATITUDE", "35.8256"),
            ("SOUK_DEFAULT_LONGITUDE", "10.6084"),
            ("SOUK_NEARBY_RADIUS_KM", "25"),
        ])
        .await
        .expect("Failed to build client");

    let nearby = state.nearby_shops(DeniedLocation);
    nearby.refresh(&ViewScope::new()).await;

    assert_eq!(nearby.position(), Coordinates::new(35.8256, 10.6084));
    assert_eq!(
        nearby.shops().first().map(|s| s.name.as_str()),
        Some("Sousse Crafts")
    );
    assert_eq!(nearby.filter("rugs").len(), 1);

    let requests = backend.requests_to("boutique/premium/discover/nearby");
    assert_eq!(requests.first().and_then(|r| r.param("radius")), Some("25"));
}
