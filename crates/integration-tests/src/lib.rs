//! Integration test support for the Souk client.
//!
//! Tests run the real [`HttpApiClient`](souk_client::api::HttpApiClient)
//! and an in-memory `SQLite` store against [`FakeBackend`], an axum server
//! on an ephemeral local port that replays canned JSON and records every
//! request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p souk-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::Json;
use serde_json::{Value, json};
use souk_client::ClientState;
use souk_client::api::HttpApiClient;
use souk_client::clock::SystemClock;
use souk_client::config::ClientConfig;
use souk_client::store::SqliteStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Error type for test setup.
pub type SetupError = Box<dyn std::error::Error + Send + Sync>;

/// A request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    /// Value of a query parameter, if present.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Body parsed as JSON, or `Value::Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct BackendState {
    /// Canned responses keyed by path, or by `path?page=N` for paged routes.
    routes: HashMap<String, (StatusCode, Value)>,
    requests: Vec<RecordedRequest>,
    offline: bool,
}

/// A local HTTP server standing in for the marketplace backend.
///
/// Unknown routes answer `404` with an unsuccessful envelope. The server
/// stops when the value is dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<Mutex<BackendState>>,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to an ephemeral port on localhost and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(Mutex::new(BackendState::default()));
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// Answer `GET /api/{path}` with `body` and status 200.
    pub fn respond(&self, path: &str, body: Value) {
        self.respond_with(path, StatusCode::OK, body);
    }

    /// Answer `GET /api/{path}?page={page}` with `body` and status 200.
    pub fn respond_page(&self, path: &str, page: u32, body: Value) {
        self.respond_with(&format!("{path}?page={page}"), StatusCode::OK, body);
    }

    /// Answer requests for `path` with an arbitrary status and body.
    pub fn respond_with(&self, path: &str, status: StatusCode, body: Value) {
        self.lock()
            .routes
            .insert(format!("/api/{path}"), (status, body));
    }

    /// While offline every request fails with `503`.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests received for `path` (relative to the API root).
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        let full = format!("/api/{path}");
        self.lock()
            .requests
            .iter()
            .filter(|r| r.path == full)
            .cloned()
            .collect()
    }

    /// Client configuration pointing at this backend.
    ///
    /// `extra` adds or overrides variables such as `SOUK_PUSH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn config(&self, extra: &[(&str, &str)]) -> Result<ClientConfig, SetupError> {
        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert("SOUK_API_BASE_URL".to_string(), self.base_url());
        vars.insert("SOUK_HTTP_TIMEOUT_SECS".to_string(), "5".to_string());
        for (key, value) in extra {
            vars.insert((*key).to_string(), (*value).to_string());
        }
        Ok(ClientConfig::from_lookup(|key| vars.get(key).cloned())?)
    }

    /// Client state backed by a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the store cannot
    /// be opened.
    pub async fn client(&self, extra: &[(&str, &str)]) -> Result<ClientState, SetupError> {
        let store = SqliteStore::in_memory().await?;
        self.client_with_store(extra, store)
    }

    /// Client state sharing an existing store, as after an app restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn client_with_store(
        &self,
        extra: &[(&str, &str)],
        store: SqliteStore,
    ) -> Result<ClientState, SetupError> {
        let config = self.config(extra)?;
        let api = HttpApiClient::new(&config.api)?;
        Ok(ClientState::new(config, api, store, Arc::new(SystemClock)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<Mutex<BackendState>>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let path = uri.path().to_string();

    let paged_key = query.get("page").map(|page| format!("{path}?page={page}"));
    state.requests.push(RecordedRequest {
        method,
        path: path.clone(),
        query,
        body,
    });

    if state.offline {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "message": "backend offline" })),
        );
    }

    let canned = paged_key
        .and_then(|key| state.routes.get(&key))
        .or_else(|| state.routes.get(&path))
        .cloned();
    match canned {
        Some((status, body)) => (status, Json(body)),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": format!("no route for {path}") })),
        ),
    }
}

// =============================================================================
// Payload builders
// =============================================================================

/// A backend product in the shape the listing endpoints return.
#[must_use]
pub fn product_json(id: &str, title: &str, price: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": format!("{title} in good condition"),
        "price": price,
        "images": [format!("https://cdn.example.com/{id}.jpg")],
        "category": "home",
        "condition": "used",
        "stock": 1,
        "location": "Tunis",
        "createdAt": "2026-03-01T10:00:00Z",
        "seller": { "_id": "seller-1", "fullName": "Amira", "city": "Tunis" },
    })
}

/// Products `{prefix}-{n}` for each `n` in `range`.
#[must_use]
pub fn products_json(prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<Value> {
    range
        .map(|n| product_json(&format!("{prefix}-{n}"), &format!("Item {n}"), "25.00"))
        .collect()
}

/// A successful `/products` page.
#[must_use]
pub fn product_list(products: Vec<Value>, total_pages: u32) -> Value {
    json!({ "success": true, "products": products, "totalPages": total_pages })
}

/// A backend shop at the given position, with coordinates sent as strings.
#[must_use]
pub fn shop_json(id: i64, name: &str, lat: f64, lng: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "city": "Tunis",
        "country": "TN",
        "latitude": lat.to_string(),
        "longitude": lng.to_string(),
        "type": "premium",
        "isVerified": true,
    })
}
