//! CLI subcommands.

pub mod deeplink;
pub mod migrate;

/// Errors raised by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL has no #fragment to look for: {0}")]
    MissingFragment(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Element #{id} not found after {attempts} attempts")]
    TargetNotFound { id: String, attempts: u32 },

    #[error("Interrupted")]
    Cancelled,
}
