//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the session database and the hosted backend before returning OK.
/// Returns 503 Service Unavailable if either is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let (database, backend) = tokio::join!(
        sqlx::query("SELECT 1").fetch_one(state.pool()),
        state.backend().health(),
    );

    match (database, backend) {
        (Ok(_), Ok(())) => StatusCode::OK,
        (database, backend) => {
            tracing::warn!(
                database_ok = database.is_ok(),
                backend_ok = backend.is_ok(),
                "Readiness check failed"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
