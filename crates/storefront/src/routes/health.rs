//! Health checks.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Liveness. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness. Verifies database connectivity when a database is configured.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
