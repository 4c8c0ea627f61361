//! Health check controller.

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use roster_service::CacheStatsSnapshot;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Application version.
    pub version: String,
    /// Cache backend and counters.
    pub cache: CacheHealth,
}

/// Cache section of the health response.
#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub backend: String,
    pub stats: CacheStatsSnapshot,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Health check endpoint.
///
/// Always reports healthy: the service keeps answering from the store when
/// the cache is unavailable.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: CacheHealth {
            backend: state.user_service.cache_backend().to_string(),
            stats: state.user_service.cache_stats(),
        },
    })
}
