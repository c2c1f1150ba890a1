//! Project task model.

use procura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TASK_PENDING: &str = "pending";
pub const TASK_IN_PROGRESS: &str = "in_progress";
pub const TASK_COMPLETED: &str = "completed";

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub starts_at: Timestamp,
    pub due_at: Timestamp,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub due_at: Timestamp,
    pub created_by: DbId,
}

/// Aggregate task counts for a project.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct TaskCountsRow {
    pub total: i64,
    pub completed: i64,
}
