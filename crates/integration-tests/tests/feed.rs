//! Discovery feed against the fake backend.
//!
//! Run with: cargo test -p souk-integration-tests --test feed

use souk_client::loader::{LoadOutcome, Origin};
use souk_client::pagination::PageResult;
use souk_client::scope::ViewScope;
use souk_client::store::SqliteStore;
use souk_core::ProductId;
use souk_integration_tests::{FakeBackend, product_list, products_json};

#[tokio::test]
async fn test_first_page_shows_ten_and_offers_more() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond_page("products", 1, product_list(products_json("p", 1..=10), 3));
    let state = backend.client(&[]).await.expect("Failed to build client");

    let feed = state.feed();
    let outcome = feed.refresh(&ViewScope::new()).await;

    assert_eq!(outcome, LoadOutcome::Fresh);
    assert_eq!(feed.items().len(), 10);
    assert!(feed.has_more());
    assert_eq!(feed.origin(), Origin::Network);

    let requests = backend.requests_to("products");
    assert_eq!(requests.len(), 1);
    let request = requests.first().expect("No request recorded");
    assert_eq!(request.param("page"), Some("1"));
    assert_eq!(request.param("limit"), Some("10"));
    assert_eq!(request.param("category"), None);
}

#[tokio::test]
async fn test_load_more_skips_products_already_shown() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond_page("products", 1, product_list(products_json("p", 1..=10), 2));
    // Page 2 overlaps page 1 by three products
    backend.respond_page("products", 2, product_list(products_json("p", 8..=17), 2));
    let state = backend.client(&[]).await.expect("Failed to build client");

    let scope = ViewScope::new();
    let feed = state.feed();
    feed.refresh(&scope).await;
    let result = feed.load_more(&scope).await.expect("Page 2 failed");

    assert_eq!(result, PageResult::Appended(7));
    let ids: Vec<String> = feed.items().iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids.len(), 17);
    assert_eq!(ids.first().map(String::as_str), Some("p-1"));
    assert_eq!(ids.last().map(String::as_str), Some("p-17"));
    assert!(!feed.has_more());

    assert_eq!(
        feed.load_more(&scope).await.expect("Exhausted feed errored"),
        PageResult::Exhausted
    );
    assert_eq!(backend.requests_to("products").len(), 2);
}

#[tokio::test]
async fn test_cached_feed_survives_backend_outage() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond_page("products", 1, product_list(products_json("p", 1..=4), 1));
    let store = SqliteStore::in_memory().await.expect("Failed to open store");

    let first = backend
        .client_with_store(&[], store.clone())
        .expect("Failed to build client");
    assert_eq!(first.feed().refresh(&ViewScope::new()).await, LoadOutcome::Fresh);

    // Same device, next launch, no network
    backend.set_offline(true);
    let second = backend
        .client_with_store(&[], store)
        .expect("Failed to build client");
    let feed = second.feed();
    let outcome = feed.refresh(&ViewScope::new()).await;

    assert_eq!(outcome, LoadOutcome::Stale);
    assert_eq!(feed.origin(), Origin::Cache);
    assert_eq!(feed.items().len(), 4);
}

#[tokio::test]
async fn test_category_feed_is_not_cached() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond_page("products", 1, product_list(products_json("lamp", 1..=3), 1));
    let state = backend.client(&[]).await.expect("Failed to build client");

    let feed = state.feed();
    let outcome = feed
        .set_category(Some("lighting".to_string()), &ViewScope::new())
        .await;
    assert_eq!(outcome, LoadOutcome::Fresh);
    assert_eq!(feed.category().as_deref(), Some("lighting"));

    let requests = backend.requests_to("products");
    let request = requests.first().expect("No request recorded");
    assert_eq!(request.param("category"), Some("lighting"));

    backend.set_offline(true);
    let reopened = state.feed();
    reopened
        .set_category(Some("lighting".to_string()), &ViewScope::new())
        .await;
    assert!(reopened.items().is_empty());
}

#[tokio::test]
async fn test_liked_flags_follow_favorites() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond_page("products", 1, product_list(products_json("p", 1..=3), 1));
    let state = backend.client(&[]).await.expect("Failed to build client");

    let feed = state.feed();
    feed.refresh(&ViewScope::new()).await;
    let id = ProductId::parse("p-2").expect("valid id");

    assert_eq!(feed.toggle_favorite(&id).await.expect("toggle failed"), Some(true));
    let liked: Vec<bool> = feed.items().iter().map(|p| p.is_liked).collect();
    assert_eq!(liked, vec![false, true, false]);
    assert_eq!(state.favorites().count().await.expect("count failed"), 1);

    assert_eq!(feed.toggle_favorite(&id).await.expect("toggle failed"), Some(false));
    assert!(feed.items().iter().all(|p| !p.is_liked));
}
