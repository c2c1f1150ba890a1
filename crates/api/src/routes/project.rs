//! Route definitions for the project lifecycle.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{project, team};
use crate::state::AppState;

/// Project routes, nested under `/projects`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list_projects).post(project::create_project))
        .route("/chain-preview", post(project::preview_chain))
        .route("/code/{code}", get(project::get_project_by_code))
        .route("/{id}", get(project::get_project))
        .route("/{id}/approve", post(project::approve_project))
        .route("/{id}/reject", post(project::reject_project))
        .route("/{id}/resubmit", post(project::resubmit_project))
        .route("/{id}/progress", post(project::progress_workflow))
        .route("/{id}/progress/refresh", post(project::refresh_progress))
        .route("/{id}/trigger-workflow", post(project::trigger_workflow))
        .route(
            "/{id}/budget-allocation/approve",
            post(project::approve_budget_allocation),
        )
        .route("/{id}/compliance/trigger", post(project::trigger_compliance))
        .route(
            "/{id}/compliance/complete",
            post(project::complete_compliance),
        )
        .route("/{id}/inventory/complete", post(project::complete_inventory))
        .route(
            "/{id}/procurement/complete",
            post(project::complete_procurement),
        )
        .route(
            "/{id}/team",
            get(team::list_team).post(team::add_team_member),
        )
        .route("/{id}/team/{user_id}", delete(team::remove_team_member))
        .route("/{id}/tasks", get(project::list_tasks))
        .route("/{id}/inventory", get(project::list_inventory))
        .route("/{id}/procurement", get(project::list_procurement))
        .route("/{id}/audit", get(project::list_audit))
        .route("/{id}/events", get(project::list_events))
}
