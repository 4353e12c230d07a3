//! Route guard decisions.
//!
//! A guard turns an [`AuthSession`] into exactly one [`GuardOutcome`]. The
//! decision is pure so the same rules drive the server-side extractors and
//! [`GuardWatch`], which re-evaluates on every auth state change.
//!
//! The web crate calls [`GuardKind::authorize`] once per request.
//! [`GuardWatch`] has no caller in this workspace; it is for long-lived
//! clients holding an [`AuthContext`], and its tests cover that use.

use crate::auth::{AuthContext, AuthSession};

/// Home route, target of the elevated guard's redirect.
pub const HOME_ROUTE: &str = "/";

/// Login route, target of the unauthenticated redirect.
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Which protected area a guard protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    /// Any signed-in user.
    Authenticated,
    /// Signed-in users with the admin flag or the moderator role.
    Staff,
}

/// What to do with a navigation into a protected area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Auth state is not resolved yet; show a neutral loading indicator.
    Loading,
    /// Nobody is signed in; go to login and come back to `from` afterwards.
    RedirectToLogin { from: String },
    /// Signed in but not allowed here.
    RedirectHome,
    /// Render the protected content.
    Render,
}

impl GuardKind {
    /// Decide the outcome of navigating to `from` under `session`.
    #[must_use]
    pub fn authorize(self, session: &AuthSession, from: &str) -> GuardOutcome {
        if session.loading {
            return GuardOutcome::Loading;
        }
        if session.user.is_none() {
            return GuardOutcome::RedirectToLogin {
                from: from.to_string(),
            };
        }
        match self {
            Self::Authenticated => GuardOutcome::Render,
            Self::Staff if session.is_staff() => GuardOutcome::Render,
            Self::Staff => GuardOutcome::RedirectHome,
        }
    }

    /// Subscribe to `ctx` and re-evaluate this guard on every change.
    #[must_use]
    pub fn watch(self, ctx: AuthContext, from: impl Into<String>) -> GuardWatch {
        GuardWatch {
            kind: self,
            from: from.into(),
            ctx,
        }
    }
}

/// A guard bound to a live [`AuthContext`].
#[derive(Debug)]
pub struct GuardWatch {
    kind: GuardKind,
    from: String,
    ctx: AuthContext,
}

impl GuardWatch {
    /// Outcome for the current auth state.
    #[must_use]
    pub fn current(&self) -> GuardOutcome {
        self.kind.authorize(&self.ctx.snapshot(), &self.from)
    }

    /// Wait for the next auth state change and return the new outcome.
    ///
    /// Returns `None` once the auth subsystem has been torn down.
    pub async fn next(&mut self) -> Option<GuardOutcome> {
        let session = self.ctx.changed().await?;
        Some(self.kind.authorize(&session, &self.from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::UserIdentity;
    use crate::types::{UserId, UserRole};

    const ALL_ROLES: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Moderator,
        UserRole::Author,
        UserRole::Member,
        UserRole::Unknown,
    ];

    fn user() -> UserIdentity {
        UserIdentity {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: "reader@example.com".to_string(),
        }
    }

    #[test]
    fn test_loading_wins_over_every_other_field() {
        for kind in [GuardKind::Authenticated, GuardKind::Staff] {
            for role in ALL_ROLES {
                for is_admin in [false, true] {
                    for user in [None, Some(user())] {
                        let session = AuthSession {
                            user,
                            loading: true,
                            is_admin,
                            role,
                        };
                        assert_eq!(kind.authorize(&session, "/x"), GuardOutcome::Loading);
                    }
                }
            }
        }
    }

    #[test]
    fn test_anonymous_redirects_to_login_with_origin() {
        for kind in [GuardKind::Authenticated, GuardKind::Staff] {
            let outcome = kind.authorize(&AuthSession::anonymous(), "/settings?tab=security");
            assert_eq!(
                outcome,
                GuardOutcome::RedirectToLogin {
                    from: "/settings?tab=security".to_string()
                }
            );
        }
    }

    #[test]
    fn test_staff_guard_sends_non_staff_home() {
        for role in [UserRole::Admin, UserRole::Author, UserRole::Member, UserRole::Unknown] {
            let session = AuthSession::signed_in(user(), role, false);
            assert_eq!(
                GuardKind::Staff.authorize(&session, "/dashboard"),
                GuardOutcome::RedirectHome
            );
        }
    }

    #[test]
    fn test_staff_guard_renders_for_admin_flag_or_moderator() {
        for role in ALL_ROLES {
            let session = AuthSession::signed_in(user(), role, true);
            assert_eq!(
                GuardKind::Staff.authorize(&session, "/dashboard"),
                GuardOutcome::Render
            );
        }
        let moderator = AuthSession::signed_in(user(), UserRole::Moderator, false);
        assert_eq!(
            GuardKind::Staff.authorize(&moderator, "/dashboard"),
            GuardOutcome::Render
        );
    }

    #[test]
    fn test_plain_guard_renders_for_any_signed_in_user() {
        for role in ALL_ROLES {
            let session = AuthSession::signed_in(user(), role, false);
            assert_eq!(
                GuardKind::Authenticated.authorize(&session, "/settings"),
                GuardOutcome::Render
            );
        }
    }

    #[tokio::test]
    async fn test_watch_reevaluates_on_each_change() {
        let (writer, ctx) = AuthContext::new();
        let mut guard = GuardKind::Staff.watch(ctx, "/dashboard");
        assert_eq!(guard.current(), GuardOutcome::Loading);

        writer.resolve(None, UserRole::Member, false);
        assert_eq!(
            guard.next().await.unwrap(),
            GuardOutcome::RedirectToLogin {
                from: "/dashboard".to_string()
            }
        );

        writer.resolve(Some(user()), UserRole::Member, false);
        assert_eq!(guard.next().await.unwrap(), GuardOutcome::RedirectHome);

        writer.resolve(Some(user()), UserRole::Moderator, false);
        assert_eq!(guard.next().await.unwrap(), GuardOutcome::Render);

        drop(writer);
        assert!(guard.next().await.is_none());
    }
}
