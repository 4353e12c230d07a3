//! Integration tests for Pageturn.
//!
//! Each test starts the full web router on an ephemeral port, backed by an
//! in-memory session store and an in-process fake of the hosted backend.
//! No database or network access is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pageturn-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `home_sections` - Listing sections on the home and announcements pages
//! - `guards` - Sign-in, sign-out and route guards
//! - `settings` - Settings tab selection

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;
use url::Url;
use uuid::Uuid;

use pageturn_core::PreviewItem;
use pageturn_web::config::{BackendConfig, WebConfig};
use pageturn_web::content::ContentStore;
use pageturn_web::middleware::configure_session_layer;
use pageturn_web::routes;
use pageturn_web::state::AppState;

/// API key the fake backend expects on every request.
pub const ANON_KEY: &str = "integration-anon-key";

// ============================================================================
// Fake hosted backend
// ============================================================================

/// An account the fake auth service accepts.
#[derive(Clone)]
struct FakeAccount {
    id: Uuid,
    email: String,
    password: String,
    profile: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    collections: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    accounts: Vec<FakeAccount>,
    requests: Vec<String>,
    sign_outs: usize,
}

/// In-process stand-in for the hosted backend's REST and auth endpoints.
///
/// Collection reads return the configured rows verbatim, so filtering and
/// ordering are left to the site.
#[derive(Clone)]
pub struct FakeBackend {
    url: Url,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Start the fake on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));

        let router = Router::new()
            .route("/rest/v1/{collection}", get(rest_select))
            .route("/auth/v1/token", post(auth_token))
            .route("/auth/v1/logout", post(auth_logout))
            .route("/auth/v1/health", get(|| async { StatusCode::OK }))
            .with_state(Arc::clone(&state));

        let addr = serve(router).await;
        let url = Url::parse(&format!("http://{addr}/")).expect("Failed to build fake backend URL");

        Self { url, state }
    }

    /// Base URL of the fake.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("Fake backend state poisoned")
    }

    /// Rows returned for `collection`.
    pub fn set_rows(&self, collection: &str, rows: Vec<Value>) {
        self.lock().collections.insert(collection.to_string(), rows);
    }

    /// Make reads of `collection` fail with HTTP 500.
    pub fn fail(&self, collection: &str) {
        self.lock().failing.insert(collection.to_string());
    }

    /// Register an account; `profile` is its `profiles` row, if any.
    pub fn add_account(&self, email: &str, password: &str, profile: Option<Value>) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().accounts.push(FakeAccount {
            id,
            email: email.to_string(),
            password: password.to_string(),
            profile,
        });
        id
    }

    /// Every REST read received, as `path?query`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// Number of sign-out calls received.
    #[must_use]
    pub fn sign_outs(&self) -> usize {
        self.lock().sign_outs
    }
}

type SharedState = Arc<Mutex<FakeState>>;

fn has_anon_key(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(ANON_KEY)
}

async fn rest_select(
    State(state): State<SharedState>,
    Path(collection): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    if !has_anon_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let query = query.unwrap_or_default();
    let mut state = state.lock().expect("Fake backend state poisoned");
    state.requests.push(format!("/rest/v1/{collection}?{query}"));

    if state.failing.contains(&collection) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }

    if collection == "profiles" {
        let id = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "id")
            .and_then(|(_, value)| value.strip_prefix("eq.").map(String::from));
        let rows: Vec<Value> = state
            .accounts
            .iter()
            .filter(|account| Some(account.id.to_string()) == id)
            .filter_map(|account| account.profile.clone())
            .collect();
        return Json(rows).into_response();
    }

    let rows = state.collections.get(&collection).cloned().unwrap_or_default();
    Json(rows).into_response()
}

async fn auth_token(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_anon_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let state = state.lock().expect("Fake backend state poisoned");

    match state
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
    {
        Some(account) => Json(json!({
            "access_token": format!("token-{}", account.id),
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": account.id, "email": account.email},
        }))
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
            .into_response(),
    }
}

async fn auth_logout(State(state): State<SharedState>) -> StatusCode {
    state.lock().expect("Fake backend state poisoned").sign_outs += 1;
    StatusCode::NO_CONTENT
}

// ============================================================================
// Site under test
// ============================================================================

/// The web app served against a [`FakeBackend`].
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub backend: FakeBackend,
}

impl TestApp {
    /// Serve the site with the given backend and sneak peek content.
    pub async fn spawn(backend: FakeBackend, sneak_peeks: Vec<PreviewItem>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read test address");
        let base_url = format!("http://{addr}");

        let config = WebConfig {
            database_url: SecretString::from("postgres://localhost/pageturn_test"),
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            session_secret: SecretString::from("k7#Qp2!vX9@mR4$wk7#Qp2!vX9@mR4$w"),
            content_dir: PathBuf::from("content"),
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../web/static")),
            backend: BackendConfig {
                url: backend.url().clone(),
                anon_key: SecretString::from(ANON_KEY),
                timeout: Duration::from_secs(2),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        // Sessions live in memory; the pool is never used.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/pageturn_test")
            .expect("Failed to build lazy pool");

        let session_layer = configure_session_layer(MemoryStore::default(), &config);
        let content = ContentStore::from_sneak_peeks(sneak_peeks);
        let state = AppState::with_content(config, pool, content)
            .expect("Failed to build application state");

        let app = routes::app(state, session_layer);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            backend,
        }
    }

    /// GET a site path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("Request failed")
    }

    /// POST a form to a site path.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        self.client
            .post(format!("{}{path}", self.base_url))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("Request failed")
    }

    /// Submit the login form.
    pub async fn login(&self, email: &str, password: &str, from: Option<&str>) -> reqwest::Response {
        let mut fields = vec![("email", email), ("password", password)];
        if let Some(from) = from {
            fields.push(("from", from));
        }
        self.post_form("/auth/login", &fields).await
    }
}

/// `name=value` pair of the first `Set-Cookie` header, if any.
#[must_use]
pub fn set_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(String::from)
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake backend");
    let addr = listener.local_addr().expect("Failed to read fake backend address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Fake backend error");
    });
    addr
}

// ============================================================================
// Fixtures
// ============================================================================

/// Announcement row as the backend returns it.
#[must_use]
pub fn announcement(id: i64, title: &str, is_active: bool, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": format!("{title} body"),
        "is_active": is_active,
        "created_at": created_at,
    })
}

/// Novel row as the backend returns it.
#[must_use]
pub fn novel(id: i64, title: &str, is_published: bool, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "A. Writer",
        "cover_url": null,
        "synopsis": format!("{title} synopsis"),
        "is_published": is_published,
        "created_at": created_at,
    })
}

/// Sneak peek entry.
#[must_use]
pub fn preview(id: &str, title: &str, release_date: &str) -> PreviewItem {
    PreviewItem {
        id: id.to_string(),
        title: title.to_string(),
        cover: format!("/static/covers/{id}.jpg"),
        release_date: release_date.parse().expect("Invalid preview date"),
        description: format!("{title} is coming."),
    }
}

/// Byte offset of `needle` in `haystack`, panicking with context if absent.
#[must_use]
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in page"))
}
