//! Handlers for user notifications.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use procura_core::types::DbId;
use procura_core::WorkflowError;
use procura_db::models::notification::Notification;
use procura_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /api/v1/users/{user_id}/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let notifications =
        NotificationRepo::list_for_user(&state.pool, user_id, query.unread_only).await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// POST /api/v1/users/{user_id}/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<serde_json::Value>> {
    let changed = NotificationRepo::mark_read(&state.pool, id, user_id).await?;
    if !changed {
        return Err(AppError::Workflow(WorkflowError::not_found(
            "notification",
            id,
        )));
    }
    Ok(Json(json!({ "data": { "read": true } })))
}

/// POST /api/v1/users/{user_id}/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::mark_all_read(&state.pool, user_id).await?;
    Ok(Json(json!({ "data": { "marked_read": count } })))
}
