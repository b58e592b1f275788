//! Push token registration against the fake backend.
//!
//! Run with: cargo test -p souk-integration-tests --test push

use axum::http::{Method, StatusCode};
use serde_json::json;
use souk_client::notifications::PushStatus;
use souk_integration_tests::FakeBackend;

const TOKEN: &str = "dQw4w9WgXcQ:APA91bHun4MxP5egoKMwt2KZFBaFUH";

#[tokio::test]
async fn test_registration_posts_user_and_token_once() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond("save-fcm-token", json!({ "success": true, "message": "saved" }));
    let state = backend
        .client(&[("SOUK_PUSH_TOKEN", TOKEN), ("SOUK_USER_ID", "42")])
        .await
        .expect("Failed to build client");
    let user_id = state.config().user_id;

    let registrar = state.push_registrar();
    assert_eq!(
        registrar.register(user_id, false).await.expect("register failed"),
        PushStatus::Registered
    );

    let requests = backend.requests_to("save-fcm-token");
    let request = requests.first().expect("No request recorded");
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.json(), json!({ "userId": 42, "fcmToken": TOKEN }));

    // Same user and token: nothing to send
    assert_eq!(
        registrar.register(user_id, false).await.expect("register failed"),
        PushStatus::Unchanged
    );
    assert_eq!(backend.requests_to("save-fcm-token").len(), 1);

    assert_eq!(
        registrar.register(user_id, true).await.expect("register failed"),
        PushStatus::Registered
    );
    assert_eq!(backend.requests_to("save-fcm-token").len(), 2);
}

#[tokio::test]
async fn test_anonymous_registration_omits_user() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond("save-fcm-token", json!({ "success": true }));
    let state = backend
        .client(&[("SOUK_PUSH_TOKEN", TOKEN)])
        .await
        .expect("Failed to build client");

    state
        .push_registrar()
        .register(None, false)
        .await
        .expect("register failed");

    let requests = backend.requests_to("save-fcm-token");
    let body = requests.first().expect("No request recorded").json();
    assert_eq!(body, json!({ "fcmToken": TOKEN }));
}

#[tokio::test]
async fn test_rejected_registration_is_retried_next_time() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    backend.respond_with(
        "save-fcm-token",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "success": false, "message": "db down" }),
    );
    let state = backend
        .client(&[("SOUK_PUSH_TOKEN", TOKEN)])
        .await
        .expect("Failed to build client");
    let registrar = state.push_registrar();

    assert!(registrar.register(None, false).await.is_err());

    backend.respond("save-fcm-token", json!({ "success": true }));
    assert_eq!(
        registrar.register(None, false).await.expect("register failed"),
        PushStatus::Registered
    );
}

#[tokio::test]
async fn test_no_token_sends_nothing() {
    let backend = FakeBackend::start().await.expect("Failed to start backend");
    let state = backend.client(&[]).await.expect("Failed to build client");

    assert_eq!(
        state
            .push_registrar()
            .register(None, false)
            .await
            .expect("register failed"),
        PushStatus::NoToken
    );
    assert!(backend.requests().is_empty());
}
