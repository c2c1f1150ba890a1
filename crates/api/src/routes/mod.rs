pub mod approval_request;
pub mod health;
pub mod notification;
pub mod procurement;
pub mod project;
pub mod template;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                        list, create
/// /projects/chain-preview                          preview an approval chain (POST)
/// /projects/code/{code}                            get by public code
/// /projects/{id}                                   get
/// /projects/{id}/approve                           approve current step (POST)
/// /projects/{id}/reject                            reject current step (POST)
/// /projects/{id}/resubmit                          resubmit after revision (POST)
/// /projects/{id}/progress                          advance workflow phase (POST)
/// /projects/{id}/progress/refresh                  recompute progress (POST)
/// /projects/{id}/trigger-workflow                  re-run post-approval dispatch (POST)
/// /projects/{id}/budget-allocation/approve         record allocation decision (POST)
/// /projects/{id}/compliance/trigger                open compliance review (POST)
/// /projects/{id}/compliance/complete               close compliance review (POST)
/// /projects/{id}/inventory/complete                inventory sub-workflow done (POST)
/// /projects/{id}/procurement/complete              procurement sub-workflow done (POST)
/// /projects/{id}/team                              list members, add member (POST)
/// /projects/{id}/team/{user_id}                    soft-remove member (DELETE)
/// /projects/{id}/tasks                             list tasks
/// /projects/{id}/inventory                         list inventory records
/// /projects/{id}/procurement                       list purchase orders
/// /projects/{id}/audit                             audit trail
/// /projects/{id}/events                            persisted event stream
///
/// /procurement/{order_id}                          get order
/// /procurement/{order_id}/deliver                  expand delivery into inventory (POST)
///
/// /approval-requests                               list pending, open (POST)
/// /approval-requests/{id}                          get
/// /approval-requests/{id}/approve                  approve current level (POST)
/// /approval-requests/{id}/reject                   reject current level (POST)
///
/// /templates                                       list by document type, register (POST)
/// /templates/expand                                match + expand into levels (POST)
/// /templates/{id}/deactivate                       retire a template (POST)
///
/// /users/{user_id}/notifications                   list (query: unread_only)
/// /users/{user_id}/notifications/read-all          mark all read (POST)
/// /users/{user_id}/notifications/{id}/read         mark one read (POST)
/// /users/{user_id}/projects                        projects the user is on
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/procurement", procurement::router())
        .nest("/approval-requests", approval_request::router())
        .nest("/templates", template::router())
        .merge(notification::router())
        .route(
            "/users/{user_id}/projects",
            get(handlers::team::list_user_projects),
        )
}
