//! Route definitions for user notifications.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// User-scoped notification routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}/notifications",
            get(notification::list_notifications),
        )
        .route(
            "/users/{user_id}/notifications/read-all",
            post(notification::mark_all_read),
        )
        .route(
            "/users/{user_id}/notifications/{id}/read",
            post(notification::mark_read),
        )
}
