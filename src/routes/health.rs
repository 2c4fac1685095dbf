//! GET /health - liveness and the active data source

use axum::routing::get;
use axum::{Extension, Json, Router};

use super::AppState;
use crate::models::HealthResponse;

/// Build the health router.
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: state.repository.source_name().to_string(),
    })
}
