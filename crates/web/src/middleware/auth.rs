//! Authentication middleware and route guard extractors.
//!
//! Each extractor snapshots the auth state held in the HTTP session and hands
//! it to [`GuardKind::authorize`]. A session that cannot be read yet counts as
//! still loading, so the reader gets a neutral waiting page instead of a
//! redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use pageturn_core::guard::{HOME_ROUTE, LOGIN_ROUTE};
use pageturn_core::{AuthSession, GuardKind, GuardOutcome};

use crate::error::add_breadcrumb;
use crate::filters;
use crate::models::{CurrentUser, Viewer, session_keys};

/// Seconds the waiting page asks the browser to wait before retrying.
const LOADING_RETRY_SECS: u32 = 1;

/// Extractor for pages any signed-in user may see.
///
/// # Example
///
/// ```rust,ignore
/// async fn settings(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor for pages restricted to admins and moderators.
///
/// Signed-in users without either are sent to the home page.
pub struct RequireStaff(pub CurrentUser);

/// Extractor that optionally gets the current user.
///
/// Unlike the guards, this never rejects; an unreadable session reads as
/// signed out.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Why a guard did not let the request through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRejection {
    /// Auth state is not available yet.
    Loading,
    /// Nobody is signed in; `from` is the path and query to come back to.
    RedirectToLogin { from: String },
    /// Signed in without the required role.
    RedirectHome,
    /// The session layer is missing from the stack.
    Unauthorized,
}

/// Neutral page shown while auth state is unavailable.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub viewer: Option<Viewer>,
    pub retry_after_secs: u32,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading => (
                StatusCode::SERVICE_UNAVAILABLE,
                [
                    (header::RETRY_AFTER, LOADING_RETRY_SECS.to_string()),
                    (header::REFRESH, LOADING_RETRY_SECS.to_string()),
                ],
                LoadingTemplate {
                    viewer: None,
                    retry_after_secs: LOADING_RETRY_SECS,
                },
            )
                .into_response(),
            Self::RedirectToLogin { from } => Redirect::to(&login_url(&from)).into_response(),
            Self::RedirectHome => Redirect::to(HOME_ROUTE).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Login URL that returns the reader to `from` afterwards.
#[must_use]
pub fn login_url(from: &str) -> String {
    format!("{LOGIN_ROUTE}?from={}", urlencoding::encode(from))
}

/// Turn a session read into the auth state the guards decide on.
fn auth_state<E: std::fmt::Display>(
    read: Result<Option<CurrentUser>, E>,
) -> (AuthSession, Option<CurrentUser>) {
    match read {
        Ok(Some(user)) => (user.auth_session(), Some(user)),
        Ok(None) => (AuthSession::anonymous(), None),
        Err(e) => {
            tracing::warn!(error = %e, "Session unavailable, auth state still loading");
            (AuthSession::loading(), None)
        }
    }
}

/// Run `kind` against the session attached to `parts`.
async fn guard(kind: GuardKind, parts: &Parts) -> Result<CurrentUser, GuardRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(GuardRejection::Unauthorized)?;

    let (auth, user) = auth_state(session.get::<CurrentUser>(session_keys::CURRENT_USER).await);

    let from = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path(), |pq| pq.as_str());

    match kind.authorize(&auth, from) {
        GuardOutcome::Render => user.ok_or(GuardRejection::Unauthorized),
        GuardOutcome::Loading => Err(GuardRejection::Loading),
        GuardOutcome::RedirectToLogin { from } => {
            add_breadcrumb("guard", "Redirected to login", Some(&[("from", from.as_str())]));
            Err(GuardRejection::RedirectToLogin { from })
        }
        GuardOutcome::RedirectHome => {
            tracing::info!(path = from, "Staff page refused, redirecting home");
            Err(GuardRejection::RedirectHome)
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(GuardKind::Authenticated, parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(GuardKind::Staff, parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

impl OptionalAuth {
    /// Page chrome view of the user, if any.
    #[must_use]
    pub fn viewer(&self) -> Option<Viewer> {
        self.0.as_ref().map(Viewer::from)
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use pageturn_core::{UserId, UserRole};

    use super::*;

    fn user(role: UserRole, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: "reader@example.com".to_string(),
            display_name: None,
            role,
            is_admin,
            access_token: "token".to_string(),
        }
    }

    fn app(signed_in: Option<CurrentUser>) -> Router {
        Router::new()
            .route(
                "/settings",
                get(|RequireAuth(user): RequireAuth| async move { user.email }),
            )
            .route(
                "/dashboard",
                get(|RequireStaff(user): RequireStaff| async move { user.email }),
            )
            .route(
                "/sign-in",
                get(move |session: Session| {
                    let user = signed_in.clone();
                    async move {
                        if let Some(user) = user {
                            set_current_user(&session, &user).await.unwrap();
                        }
                    }
                }),
            )
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    async fn session_cookie(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::get("/sign-in").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn get_with(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[test]
    fn test_login_url_encodes_origin() {
        assert_eq!(
            login_url("/settings?tab=security"),
            "/auth/login?from=%2Fsettings%3Ftab%3Dsecurity"
        );
    }

    #[test]
    fn test_unreadable_session_is_loading() {
        let (auth, user) = auth_state::<&str>(Err("store offline"));
        assert!(auth.loading);
        assert!(user.is_none());

        let (auth, _) = auth_state::<&str>(Ok(None));
        assert!(!auth.loading);
        assert!(auth.user.is_none());
    }

    #[test]
    fn test_loading_rejection_is_a_neutral_wait() {
        let response = GuardRejection::Loading.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
        assert_eq!(response.headers()[header::REFRESH], "1");
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_anonymous_is_sent_to_login_with_origin() {
        let app = app(None);
        let response = get_with(&app, "/settings?tab=security", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "/auth/login?from=%2Fsettings%3Ftab%3Dsecurity"
        );
    }

    #[tokio::test]
    async fn test_member_renders_settings_but_not_dashboard() {
        let app = app(Some(user(UserRole::Member, false)));
        let cookie = session_cookie(&app).await;

        let response = get_with(&app, "/settings", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_with(&app, "/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_moderator_and_admin_render_dashboard() {
        for signed_in in [user(UserRole::Moderator, false), user(UserRole::Member, true)] {
            let app = app(Some(signed_in));
            let cookie = session_cookie(&app).await;
            let response = get_with(&app, "/dashboard", Some(&cookie)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_unauthorized() {
        let app = Router::new().route(
            "/settings",
            get(|RequireAuth(user): RequireAuth| async move { user.email }),
        );
        let response = app
            .oneshot(Request::get("/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
