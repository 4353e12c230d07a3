//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The sessions
//! table is created by `pageturn-cli migrate`. Session cookies are signed
//! with a key derived from `PAGETURN_SESSION_SECRET`.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::WebConfig;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pageturn_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session layer as configured for the site.
pub type SiteSessionLayer<S> = SessionManagerLayer<S, SignedCookie>;

/// Create the production session layer backed by the session database.
#[must_use]
pub fn create_session_layer(state: &AppState) -> SiteSessionLayer<PostgresStore> {
    let store = PostgresStore::new(state.pool().clone());
    configure_session_layer(store, state.config())
}

/// Apply the site's cookie settings to a session layer over any store.
#[must_use]
pub fn configure_session_layer<S>(store: S, config: &WebConfig) -> SiteSessionLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(session_key(&config.session_secret))
}

/// Cookie signing key for a session secret.
///
/// The secret is validated to at least 32 characters at start-up; hashing
/// stretches it to the 64 bytes the signing key needs.
#[must_use]
pub fn session_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
