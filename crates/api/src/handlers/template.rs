//! Handlers for workflow templates.
//!
//! Templates are the declarative chain mechanism for non-project document
//! flows; matching and step expansion live in `procura_core::template`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use procura_core::types::{ApprovalLevel, DbId, DepartmentKind};
use procura_core::WorkflowError;
use procura_db::models::workflow_template::{CreateWorkflowTemplate, WorkflowTemplateRow};
use procura_db::repositories::WorkflowTemplateRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub document_type: String,
}

/// Document attributes for template matching and expansion.
#[derive(Debug, Deserialize)]
pub struct ExpandRequest {
    pub document_type: String,
    pub category: Option<String>,
    pub budget: i64,
    pub department_kind: DepartmentKind,
}

/// POST /api/v1/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflowTemplate>,
) -> AppResult<impl IntoResponse> {
    if input.steps.is_empty() {
        return Err(AppError::BadRequest("a template needs at least one step".into()));
    }
    let row = WorkflowTemplateRepo::create(&state.pool, &input).await?;

    tracing::info!(template_id = row.id, name = %row.name, "Workflow template registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

/// GET /api/v1/templates?document_type=...
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> AppResult<Json<DataResponse<Vec<WorkflowTemplateRow>>>> {
    let rows = WorkflowTemplateRepo::find_active(&state.pool, &query.document_type).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/templates/expand
///
/// Find the most specific active template matching the document and
/// expand it into the ordered approval levels whose conditions hold.
pub async fn expand_template(
    State(state): State<AppState>,
    Json(input): Json<ExpandRequest>,
) -> AppResult<Json<DataResponse<Vec<ApprovalLevel>>>> {
    let rows = WorkflowTemplateRepo::find_active(&state.pool, &input.document_type).await?;
    // Categorized templates sort first, so the first match is the most
    // specific one.
    let template = rows
        .into_iter()
        .map(|row| row.into_domain())
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .find(|t| t.matches(&input.document_type, input.category.as_deref()))
        .ok_or_else(|| {
            AppError::Workflow(WorkflowError::not_found("workflow template", &input.document_type))
        })?;

    let levels = template.expand(input.budget, input.department_kind);
    Ok(Json(DataResponse { data: levels }))
}

/// POST /api/v1/templates/{id}/deactivate
pub async fn deactivate_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let changed = WorkflowTemplateRepo::deactivate(&state.pool, id).await?;
    if !changed {
        return Err(AppError::Workflow(WorkflowError::not_found(
            "workflow template",
            id,
        )));
    }

    tracing::info!(template_id = id, "Workflow template deactivated");

    Ok(Json(json!({ "data": { "deactivated": true } })))
}
