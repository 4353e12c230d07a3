//! Client for the hosted data backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for announcements, novels and
//!   profiles. There is no local copy and no response cache.
//! - Listing reads follow one fixed contract (see [`SectionQuery`]):
//!   `select * from <collection> where <flag> = true order by <ts> desc`.
//! - Authentication goes through the backend's auth service; the returned
//!   access token is kept server-side in the session.
//!
//! # Example
//!
//! ```rust,ignore
//! use pageturn_core::{Announcement, SectionQuery};
//! use pageturn_web::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let rows: Vec<Announcement> = client.select_active(SectionQuery::ANNOUNCEMENTS).await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{BackendUser, Profile, SignIn};

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Email/password rejected by the auth service.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Re-exported so callers can name the read contract next to the client.
pub use pageturn_core::SectionQuery;
