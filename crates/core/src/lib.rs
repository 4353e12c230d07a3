//! Pageturn Core - Shared types and front-end components.
//!
//! This crate provides the pieces of the reading site that do not depend on
//! a transport or a database:
//! - `web` - Server-rendered reading site
//! - `cli` - Operator tools for migrations and deep-link checks
//!
//! # Architecture
//!
//! Nothing in here performs I/O. Components that wait (the anchor scroller,
//! the auth context) only use Tokio timers, channels and tasks, so they can
//! be driven by a real event loop or by a paused test clock.
//!
//! # Modules
//!
//! - [`types`] - IDs, roles and listing entities
//! - [`auth`] - Auth session snapshot and the shared, observable auth context
//! - [`guard`] - Route guard decisions
//! - [`section`] - Fetch, filter, sort and render rules for listing sections
//! - [`settings`] - Settings tab selection
//! - [`location`] - Site-relative locations and fragments
//! - [`retry`] - Bounded retry with interval, deadline and cancellation
//! - [`anchor`] - Deferred scroll to a fragment target

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod anchor;
pub mod auth;
pub mod guard;
pub mod location;
pub mod retry;
pub mod section;
pub mod settings;
pub mod types;

pub use auth::{AuthContext, AuthSession, AuthWriter, UserIdentity};
pub use guard::{GuardKind, GuardOutcome};
pub use location::Location;
pub use section::{ListSection, SectionHeader, SectionLayout, SectionLoad, SectionQuery};
pub use settings::{SettingsTab, SettingsTabs};
pub use types::*;
