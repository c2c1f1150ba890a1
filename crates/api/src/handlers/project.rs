//! Handlers for the project lifecycle.
//!
//! Creation, chain execution, phase movement, the post-approval
//! sub-workflow callbacks, and the read-side listings. All workflow
//! mutations go through [`procura_workflow::WorkflowService`]; listings
//! read the repositories directly.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use procura_core::chain::ApprovalStep;
use procura_core::project::{actions, Project};
use procura_core::types::{ApprovalLevel, DbId, ProjectScope, WorkflowPhase};
use procura_db::repositories::{
    AuditRepo, EventRepo, InventoryRepo, ProcurementRepo, ProjectRepo, TaskRepo,
};
use procura_workflow::CreateProjectInput;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub department_id: Option<DbId>,
    pub status: Option<String>,
}

/// Preview input mirroring the creation fields that drive chain shape.
#[derive(Debug, Deserialize)]
pub struct ChainPreviewRequest {
    pub scope: ProjectScope,
    pub budget: i64,
    #[serde(default)]
    pub requires_budget_allocation: bool,
    pub created_by: DbId,
    pub department_id: DbId,
}

/// An approve/reject decision on the current chain step.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub approver_id: DbId,
    pub level: ApprovalLevel,
    pub comments: Option<String>,
}

/// A request carrying only the acting user.
#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub user_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub phase: WorkflowPhase,
    pub triggered_by: DbId,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Creation & reads
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Open a new project: classifies the budget, reserves a code, generates
/// the approval chain, and notifies the first approver.
pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> AppResult<impl IntoResponse> {
    let project = state.service.create_project(input).await?;

    tracing::info!(
        project_id = project.id,
        code = %project.code,
        scope = %project.scope,
        "Project created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// POST /api/v1/projects/chain-preview
///
/// Build the chain a hypothetical project would get, without persisting.
pub async fn preview_chain(
    State(state): State<AppState>,
    Json(input): Json<ChainPreviewRequest>,
) -> AppResult<Json<DataResponse<Vec<ApprovalStep>>>> {
    let chain = state
        .service
        .generate_approval_chain(
            input.scope,
            input.budget,
            input.requires_budget_allocation,
            input.created_by,
            input.department_id,
        )
        .await?;
    Ok(Json(DataResponse { data: chain }))
}

/// GET /api/v1/projects
///
/// List projects, optionally filtered by department or status.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let rows = match (&query.status, query.department_id) {
        (Some(status), _) => ProjectRepo::list_pending_for(&state.pool, status).await?,
        (None, Some(department_id)) => {
            ProjectRepo::list_by_department(&state.pool, department_id).await?
        }
        (None, None) => ProjectRepo::list(&state.pool).await?,
    };
    let projects = rows
        .into_iter()
        .map(|row| row.into_domain())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let row = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Workflow(procura_core::WorkflowError::not_found("project", id)))?;
    Ok(Json(DataResponse {
        data: row.into_domain()?,
    }))
}

/// GET /api/v1/projects/code/{code}
pub async fn get_project_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<Project>>> {
    let row = ProjectRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| {
            AppError::Workflow(procura_core::WorkflowError::not_found("project", code))
        })?;
    Ok(Json(DataResponse {
        data: row.into_domain()?,
    }))
}

// ---------------------------------------------------------------------------
// Chain execution
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/approve
pub async fn approve_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .approve_project(id, input.approver_id, input.level, input.comments)
        .await?;

    tracing::info!(
        project_id = id,
        approver = input.approver_id,
        level = %input.level,
        status = %project.status,
        "Approval step recorded"
    );

    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/reject
pub async fn reject_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .reject_project(id, input.approver_id, input.level, input.comments)
        .await?;

    tracing::info!(
        project_id = id,
        rejecter = input.approver_id,
        level = %input.level,
        "Rejection recorded"
    );

    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/resubmit
pub async fn resubmit_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.service.resubmit_project(id, input.user_id).await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Phase movement & dispatch
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/progress
pub async fn progress_workflow(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ProgressRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .progress_workflow(
            id,
            input.phase,
            actions::PHASE_PROGRESSED,
            input.triggered_by,
            input.metadata,
        )
        .await?;

    tracing::info!(
        project_id = id,
        phase = %project.workflow_phase,
        status = %project.status,
        "Workflow phase advanced"
    );

    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/trigger-workflow
///
/// Re-run the post-approval dispatch for an already-approved project.
pub async fn trigger_workflow(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .trigger_post_approval_workflow(id, input.user_id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/budget-allocation/approve
pub async fn approve_budget_allocation(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .approve_budget_allocation(id, input.user_id)
        .await?;

    tracing::info!(project_id = id, approver = input.user_id, "Budget allocation approved");

    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/compliance/trigger
pub async fn trigger_compliance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .trigger_regulatory_compliance(id, input.user_id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/compliance/complete
pub async fn complete_compliance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .complete_regulatory_compliance(id, input.user_id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/inventory/complete
pub async fn complete_inventory(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.service.complete_inventory(id, input.user_id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/procurement/complete
pub async fn complete_procurement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.service.complete_procurement(id, input.user_id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/progress/refresh
///
/// Recompute the two-phase progress numbers from current task counts.
pub async fn refresh_progress(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.service.update_two_phase_progress(id).await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Read-side listings
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tasks = TaskRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/projects/{id}/inventory
pub async fn list_inventory(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let items = InventoryRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/projects/{id}/procurement
pub async fn list_procurement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let orders = ProcurementRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/projects/{id}/audit
pub async fn list_audit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entries = AuditRepo::list_for_entity(&state.pool, "project", id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/projects/{id}/events
pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let events = EventRepo::list_for_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: events }))
}
