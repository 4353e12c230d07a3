//! Types stored in the HTTP session.

pub mod session;

pub use session::{CurrentUser, Viewer, keys as session_keys};
