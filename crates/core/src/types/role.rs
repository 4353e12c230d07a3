//! User roles assigned by the hosted backend's `profiles` table.

use serde::{Deserialize, Serialize};

/// Role attached to a reader's profile.
///
/// Roles are managed by the backend's admin surface; this crate only reads
/// them. Values the backend adds later deserialize as [`UserRole::Unknown`]
/// and carry no elevated permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full platform administration.
    Admin,
    /// Community moderation.
    Moderator,
    /// Publishes novels on the platform.
    Author,
    /// Regular reader.
    #[default]
    Member,
    /// A role this build does not know about.
    #[serde(other)]
    Unknown,
}

impl UserRole {
    /// Whether this role is the moderator role.
    #[must_use]
    pub const fn is_moderator(self) -> bool {
        matches!(self, Self::Moderator)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Moderator => write!(f, "moderator"),
            Self::Author => write!(f, "author"),
            Self::Member => write!(f, "member"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "author" => Ok(Self::Author),
            "member" => Ok(Self::Member),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}
