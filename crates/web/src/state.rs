//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::{BackendClient, BackendError};
use crate::config::WebConfig;
use crate::content::{ContentError, ContentStore};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the session database pool and the backend client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: PgPool,
    backend: BackendClient,
    content: ContentStore,
}

impl AppState {
    /// Create a new application state, loading static content from
    /// `config.content_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built or the content
    /// directory holds malformed files.
    pub fn new(config: WebConfig, pool: PgPool) -> Result<Self, StateError> {
        let content = ContentStore::load(&config.content_dir)?;
        Self::with_content(config, pool, content)
    }

    /// Create a new application state with already loaded content.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn with_content(
        config: WebConfig,
        pool: PgPool,
        content: ContentStore,
    ) -> Result<Self, StateError> {
        let backend = BackendClient::new(&config.backend)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
                content,
            }),
        })
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the session database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the hosted backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the static content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
