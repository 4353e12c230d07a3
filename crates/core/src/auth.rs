//! Authentication state shared between the auth subsystem and its readers.
//!
//! [`AuthSession`] is a snapshot of who is signed in. [`AuthContext`] makes
//! that snapshot observable: exactly one [`AuthWriter`] (the auth subsystem)
//! publishes new snapshots, and any number of readers (route guards, the
//! settings view) subscribe to changes instead of polling.
//!
//! # Lifecycle
//!
//! ```text
//! AuthContext::new()      -> loading
//! AuthWriter::resolve()   -> resolved (signed in or anonymous)
//! AuthWriter::begin_refresh() -> loading again while a token is refreshed
//! AuthWriter::sign_out()  -> resolved, anonymous
//! drop(AuthWriter)        -> torn down; readers see their last snapshot
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::types::{UserId, UserRole};

/// The signed-in user as reported by the backend auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
}

/// Snapshot of the authentication state.
///
/// While `loading` is set no authorization decision may be taken from the
/// other fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: Option<UserIdentity>,
    pub loading: bool,
    pub is_admin: bool,
    pub role: UserRole,
}

impl AuthSession {
    /// State before the auth subsystem has reported anything.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            user: None,
            loading: true,
            is_admin: false,
            role: UserRole::Member,
        }
    }

    /// Resolved state with nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user: None,
            loading: false,
            is_admin: false,
            role: UserRole::Member,
        }
    }

    /// Resolved state for a signed-in user.
    #[must_use]
    pub const fn signed_in(user: UserIdentity, role: UserRole, is_admin: bool) -> Self {
        Self {
            user: Some(user),
            loading: false,
            is_admin,
            role,
        }
    }

    /// Whether the session may enter the staff area (admin flag or moderator).
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.is_admin || self.role.is_moderator()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::loading()
    }
}

/// Read side of the shared auth state.
///
/// Cheap to clone; every clone observes the same writer.
#[derive(Debug, Clone)]
pub struct AuthContext {
    rx: watch::Receiver<AuthSession>,
}

/// Write side of the shared auth state. There is exactly one per context.
#[derive(Debug)]
pub struct AuthWriter {
    tx: watch::Sender<AuthSession>,
}

impl AuthContext {
    /// Create a context in the loading state along with its only writer.
    #[must_use]
    pub fn new() -> (AuthWriter, Self) {
        let (tx, rx) = watch::channel(AuthSession::loading());
        (AuthWriter { tx }, Self { rx })
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> AuthSession {
        self.rx.borrow().clone()
    }

    /// Wait for the writer to publish a new snapshot and return it.
    ///
    /// Returns `None` once the writer has been dropped.
    pub async fn changed(&mut self) -> Option<AuthSession> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl AuthWriter {
    /// Publish the outcome of resolving the current user.
    pub fn resolve(&self, user: Option<UserIdentity>, role: UserRole, is_admin: bool) {
        let session = match user {
            Some(user) => AuthSession::signed_in(user, role, is_admin),
            None => AuthSession::anonymous(),
        };
        tracing::debug!(
            signed_in = session.user.is_some(),
            role = %session.role,
            is_admin = session.is_admin,
            "Auth state resolved"
        );
        self.tx.send_replace(session);
    }

    /// Mark the state as loading again, e.g. while a token is refreshed.
    pub fn begin_refresh(&self) {
        self.tx.send_modify(|session| session.loading = true);
    }

    /// Clear the signed-in user.
    pub fn sign_out(&self) {
        tracing::debug!("Auth state cleared by sign-out");
        self.tx.send_replace(AuthSession::anonymous());
    }

    /// Create another reader of this writer's state.
    #[must_use]
    pub fn subscribe(&self) -> AuthContext {
        AuthContext {
            rx: self.tx.subscribe(),
        }
    }
}
