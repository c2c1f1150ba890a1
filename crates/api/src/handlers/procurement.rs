//! Handlers for procurement order delivery.

use axum::extract::{Path, State};
use axum::Json;

use procura_core::project::Project;
use procura_core::types::DbId;
use procura_core::WorkflowError;
use procura_db::models::procurement::ProcurementOrder;
use procura_db::repositories::ProcurementRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::project::ActorRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/procurement/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProcurementOrder>>> {
    let order = ProcurementRepo::find_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| {
            AppError::Workflow(WorkflowError::not_found("procurement order", order_id))
        })?;
    Ok(Json(DataResponse { data: order }))
}

/// POST /api/v1/procurement/{order_id}/deliver
///
/// Acknowledge delivery: marks the order delivered and expands its line
/// items into individual inventory records on the owning project.
pub async fn deliver_order(
    State(state): State<AppState>,
    Path(order_id): Path<DbId>,
    Json(input): Json<ActorRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .create_inventory_from_procurement(order_id, input.user_id)
        .await?;

    tracing::info!(order_id, project_id = project.id, "Delivery expanded into inventory");

    Ok(Json(DataResponse { data: project }))
}
