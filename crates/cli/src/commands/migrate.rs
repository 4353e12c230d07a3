//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! pageturn-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PAGETURN_DATABASE_URL` - `PostgreSQL` connection string for the session
//!   store (falls back to `DATABASE_URL`)
//!
//! Content lives in the hosted backend, so the only local schema is the
//! tower-sessions table.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;

/// Create or update the session store schema.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database is
/// unreachable, or the migration fails.
pub async fn sessions() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to session database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session store migrations complete!");
    Ok(())
}

fn database_url() -> Result<SecretString, CommandError> {
    std::env::var("PAGETURN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("PAGETURN_DATABASE_URL"))
}
