//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use pageturn_core::{AuthSession, UserId, UserIdentity, UserRole};

/// Session-stored user identity.
///
/// Written once at login from the backend's auth response and profile row.
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// User's email address.
    pub email: String,
    /// Display name from the profile row.
    pub display_name: Option<String>,
    /// Role from the profile row.
    pub role: UserRole,
    /// Admin flag from the profile row.
    pub is_admin: bool,
    /// Backend access token, used for sign-out.
    pub access_token: String,
}

impl CurrentUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    /// Resolved auth state for this user.
    #[must_use]
    pub fn auth_session(&self) -> AuthSession {
        AuthSession::signed_in(
            UserIdentity {
                id: self.id,
                email: self.email.clone(),
            },
            self.role,
            self.is_admin,
        )
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("is_admin", &self.is_admin)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// What page chrome needs to know about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub name: String,
    pub is_staff: bool,
}

impl From<&CurrentUser> for Viewer {
    fn from(user: &CurrentUser) -> Self {
        Self {
            name: user.greeting_name().to_string(),
            is_staff: user.auth_session().is_staff(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
