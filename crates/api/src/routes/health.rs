//! Health check route.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// Root-level health router (`GET /health`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Reports process liveness and database connectivity.
async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    procura_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
