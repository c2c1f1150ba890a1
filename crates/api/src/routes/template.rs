//! Route definitions for workflow templates.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::template;
use crate::state::AppState;

/// Workflow template routes, nested under `/templates`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(template::list_templates).post(template::create_template))
        .route("/expand", post(template::expand_template))
        .route("/{id}/deactivate", post(template::deactivate_template))
}
