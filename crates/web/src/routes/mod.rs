//! HTTP route handlers for the reading site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Home page (announcements, latest novels, sneak peeks)
//! GET  /announcements     - All active announcements
//! GET  /health            - Liveness check
//! GET  /health/ready      - Readiness check (session database + backend)
//!
//! # Auth
//! GET  /auth/login        - Login page (?from=..., ?error=...)
//! POST /auth/login        - Login action
//! POST /auth/logout       - Logout action
//!
//! # Signed in
//! GET  /settings          - Profile and security tabs (?tab=profile|security)
//!
//! # Staff (admin or moderator)
//! GET  /dashboard         - Listing health overview
//! ```

pub mod announcements;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod home;
pub mod settings;

use axum::{
    Router,
    extract::Request,
    middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::error::not_found;
use crate::middleware::{SiteSessionLayer, request_id_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/announcements", get(announcements::index))
        .route("/settings", get(settings::index))
        .route("/dashboard", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/health", health_routes())
}

/// Assemble the full application with its middleware stack.
///
/// The session layer is passed in so tests can swap the store.
pub fn app<Store>(state: AppState, session_layer: SiteSessionLayer<Store>) -> Router
where
    Store: SessionStore + Clone,
{
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .merge(routes())
        .nest_service("/static", static_files)
        .fallback(not_found)
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
