//! Handlers for project team membership.
//!
//! Membership is held on the project aggregate; the `team_members` table
//! is the cross-project query side and is updated alongside the aggregate
//! mutation.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use procura_core::project::Project;
use procura_core::types::DbId;
use procura_db::models::team_member::{CreateTeamMember, TeamMemberRow};
use procura_db::repositories::TeamMemberRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: DbId,
    pub role: String,
    pub added_by: DbId,
}

#[derive(Debug, Deserialize)]
pub struct RemoveMemberRequest {
    pub removed_by: DbId,
}

/// GET /api/v1/projects/{id}/team
pub async fn list_team(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TeamMemberRow>>>> {
    let members = TeamMemberRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/projects/{id}/team
pub async fn add_team_member(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .add_team_member(id, input.user_id, input.role.clone(), input.added_by)
        .await?;
    TeamMemberRepo::upsert(
        &state.pool,
        &CreateTeamMember {
            project_id: id,
            user_id: input.user_id,
            role: input.role,
        },
    )
    .await?;

    tracing::info!(project_id = id, user_id = input.user_id, "Team member added");

    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}/team/{user_id}
pub async fn remove_team_member(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(DbId, DbId)>,
    Json(input): Json<RemoveMemberRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .service
        .remove_team_member(id, user_id, input.removed_by)
        .await?;
    TeamMemberRepo::deactivate(&state.pool, id, user_id).await?;

    tracing::info!(project_id = id, user_id, "Team member removed");

    Ok(Json(DataResponse { data: project }))
}

/// GET /api/v1/users/{user_id}/projects
///
/// Active memberships for a user across all projects.
pub async fn list_user_projects(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TeamMemberRow>>>> {
    let memberships = TeamMemberRepo::list_projects_for_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: memberships }))
}
