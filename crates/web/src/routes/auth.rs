//! Authentication route handlers.
//!
//! Sign-in goes through the hosted backend's password grant. The profile row
//! decides role and admin flag; everything lands in the session as a
//! [`CurrentUser`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pageturn_core::guard::{HOME_ROUTE, LOGIN_ROUTE};
use pageturn_core::location::safe_return_path;
use pageturn_core::UserId;

use crate::backend::{BackendError, Profile};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Viewer};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Where to go after signing in, carried over from the guard redirect.
    #[serde(default)]
    pub from: Option<String>,
}

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub viewer: Option<Viewer>,
    pub error: Option<&'static str>,
    pub from: Option<String>,
}

/// Reader-facing text for a login error code.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "That email and password don't match an account.",
        _ => "Sign-in is unavailable right now. Please try again shortly.",
    }
}

/// Local path to return to after login, if `from` is one.
fn return_target(from: Option<&str>) -> Option<&str> {
    from.and_then(safe_return_path)
}

/// Login page URL carrying an error code and the return target.
fn login_error_url(code: &str, from: Option<&str>) -> String {
    match return_target(from) {
        Some(from) => format!(
            "{LOGIN_ROUTE}?error={code}&from={}",
            urlencoding::encode(from)
        ),
        None => format!("{LOGIN_ROUTE}?error={code}"),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// Readers who are already signed in go straight to their return target.
pub async fn login_page(auth: OptionalAuth, Query(query): Query<LoginQuery>) -> Response {
    let from = return_target(query.from.as_deref()).map(String::from);

    if auth.0.is_some() {
        return Redirect::to(from.as_deref().unwrap_or(HOME_ROUTE)).into_response();
    }

    LoginTemplate {
        viewer: None,
        error: query.error.as_deref().map(error_message),
        from,
    }
    .into_response()
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns an error if the session store cannot be written. Backend failures
/// send the reader back to the login form instead.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let from = form.from.as_deref();
    let password = SecretString::from(form.password);

    let sign_in = match state
        .backend()
        .sign_in_with_password(&form.email, &password)
        .await
    {
        Ok(sign_in) => sign_in,
        Err(BackendError::InvalidCredentials) => {
            tracing::info!("Login rejected");
            return Ok(Redirect::to(&login_error_url("credentials", from)).into_response());
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            return Ok(Redirect::to(&login_error_url("unavailable", from)).into_response());
        }
    };

    let user_id = UserId::from(sign_in.user.id);
    let profile = state
        .backend()
        .fetch_profile(user_id, &sign_in.access_token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = %user_id, "Profile unavailable, signing in as member: {e}");
            Profile::default()
        });

    let user = CurrentUser {
        id: user_id,
        email: sign_in.user.email.unwrap_or(form.email),
        display_name: profile.display_name,
        role: profile.role,
        is_admin: profile.is_admin,
        access_token: sign_in.access_token,
    };

    // New session ID on privilege change
    session.cycle_id().await?;
    set_current_user(&session, &user).await?;

    set_sentry_user(&user.id, Some(&user.email));
    tracing::info!(user_id = %user.id, role = %user.role, "Signed in");

    Ok(Redirect::to(return_target(from).unwrap_or(HOME_ROUTE)).into_response())
}

/// Handle logout.
///
/// Backend sign-out is best effort; the local session is cleared either way.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Redirect> {
    if let Some(user) = user {
        if let Err(e) = state.backend().sign_out(&user.access_token).await {
            tracing::warn!(user_id = %user.id, "Backend sign-out failed: {e}");
        }
    }

    clear_sentry_user();
    clear_current_user(&session).await?;
    session.flush().await?;

    Ok(Redirect::to(HOME_ROUTE))
}
