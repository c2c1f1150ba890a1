//! Route definitions for generic approval requests.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::approval_request;
use crate::state::AppState;

/// Generic approval request routes, nested under `/approval-requests`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(approval_request::list_pending).post(approval_request::create_request),
        )
        .route("/{id}", get(approval_request::get_request))
        .route("/{id}/approve", post(approval_request::approve_request))
        .route("/{id}/reject", post(approval_request::reject_request))
}
