//! Route definitions for procurement order delivery.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::procurement;
use crate::state::AppState;

/// Procurement routes, nested under `/procurement`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{order_id}", get(procurement::get_order))
        .route("/{order_id}/deliver", post(procurement::deliver_order))
}
