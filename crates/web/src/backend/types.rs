//! Response shapes of the hosted backend.

use serde::Deserialize;

use pageturn_core::UserRole;

/// Successful password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct SignIn {
    pub access_token: String,
    pub user: BackendUser,
}

/// User record embedded in auth responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendUser {
    pub id: uuid::Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Row of the `profiles` table.
///
/// A user without a profile row is treated as a plain member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub is_admin: bool,
}
