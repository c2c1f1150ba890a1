//! Repository for the `tasks` table.

use procura_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, TaskCountsRow};

const COLUMNS: &str = "id, project_id, title, description, status, starts_at, due_at, created_by, \
     created_at, updated_at";

/// Provides operations for project tasks.
pub struct TaskRepo;

impl TaskRepo {
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, title, description, status, starts_at, due_at,
                created_by)
             VALUES ($1, $2, $3, 'pending', $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.due_at)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Insert a batch of tasks inside one transaction.
    pub async fn create_many(pool: &PgPool, inputs: &[CreateTask]) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, title, description, status, starts_at, due_at,
                created_by)
             VALUES ($1, $2, $3, 'pending', $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let task = sqlx::query_as::<_, Task>(&query)
                .bind(input.project_id)
                .bind(&input.title)
                .bind(&input.description)
                .bind(input.starts_at)
                .bind(input.due_at)
                .bind(input.created_by)
                .fetch_one(&mut *tx)
                .await?;
            created.push(task);
        }
        tx.commit().await?;
        Ok(created)
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY starts_at");
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Total and completed counts for a project's tasks.
    pub async fn counts_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<TaskCountsRow, sqlx::Error> {
        sqlx::query_as::<_, TaskCountsRow>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'completed') AS completed
             FROM tasks WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// Move a task to a new status. Returns the updated row, or `None`
    /// if the task does not exist.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
