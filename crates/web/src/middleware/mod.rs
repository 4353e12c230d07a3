//! HTTP middleware stack for the reading site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (fills the span field, tags Sentry, echoes the header)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Route guards are extractors rather than layers; see [`auth`].

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    GuardRejection, OptionalAuth, RequireAuth, RequireStaff, clear_current_user, login_url,
    set_current_user,
};
pub use request_id::request_id_middleware;
pub use session::{
    SESSION_COOKIE_NAME, SiteSessionLayer, configure_session_layer, create_session_layer,
    session_key,
};
