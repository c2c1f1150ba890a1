//! Handlers for generic department-hierarchy approval requests.
//!
//! These cover non-project approvables (expense claims, document
//! sign-offs). The level-indexed chain logic lives in
//! `procura_core::approval_request`; handlers load the row, apply the
//! decision, and persist the result.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use procura_core::approval_request::ApprovalRequest;
use procura_core::types::DbId;
use procura_core::WorkflowError;
use procura_db::models::approval_request::CreateApprovalRequest;
use procura_db::repositories::ApprovalRequestRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LevelDecisionRequest {
    pub user_id: DbId,
    pub level: u32,
    pub comments: Option<String>,
}

/// POST /api/v1/approval-requests
pub async fn create_request(
    State(state): State<AppState>,
    Json(input): Json<CreateApprovalRequest>,
) -> AppResult<impl IntoResponse> {
    if input.chain_roles.is_empty() {
        return Err(AppError::BadRequest(
            "an approval request needs at least one chain level".into(),
        ));
    }
    let row = ApprovalRequestRepo::create(&state.pool, &input).await?;
    let request = row.into_domain()?;

    tracing::info!(
        request_id = request.id,
        entity_type = %request.entity_type,
        entity_id = request.entity_id,
        "Approval request opened"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/approval-requests
pub async fn list_pending(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ApprovalRequest>>>> {
    let rows = ApprovalRequestRepo::list_pending(&state.pool).await?;
    let requests = rows
        .into_iter()
        .map(|row| row.into_domain())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/approval-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ApprovalRequest>>> {
    let request = load(&state, id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/approval-requests/{id}/approve
pub async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<LevelDecisionRequest>,
) -> AppResult<Json<DataResponse<ApprovalRequest>>> {
    let mut request = load(&state, id).await?;
    request.approve(input.user_id, input.level, input.comments, chrono::Utc::now())?;
    ApprovalRequestRepo::save(&state.pool, &request).await?;

    tracing::info!(
        request_id = id,
        level = input.level,
        status = %request.status,
        "Approval request level approved"
    );

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/approval-requests/{id}/reject
pub async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<LevelDecisionRequest>,
) -> AppResult<Json<DataResponse<ApprovalRequest>>> {
    let mut request = load(&state, id).await?;
    request.reject(input.user_id, input.level, input.comments, chrono::Utc::now())?;
    ApprovalRequestRepo::save(&state.pool, &request).await?;

    tracing::info!(request_id = id, level = input.level, "Approval request rejected");

    Ok(Json(DataResponse { data: request }))
}

async fn load(state: &AppState, id: DbId) -> Result<ApprovalRequest, AppError> {
    let row = ApprovalRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Workflow(WorkflowError::not_found("approval request", id)))?;
    Ok(row.into_domain()?)
}
