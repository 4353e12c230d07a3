//! Core types for Pageturn.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod content;
pub mod id;
pub mod role;

pub use content::{Announcement, Novel, PreviewItem};
pub use id::*;
pub use role::UserRole;
