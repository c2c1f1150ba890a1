//! Repository for the `projects` table.

use procura_core::project::Project;
use procura_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::ProjectRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, description, scope, department_id, created_by, budget, \
     actual_cost, budget_threshold, requires_budget_allocation, requires_compliance, status, \
     workflow_phase, workflow_step, workflow_history, approval_chain, workflow_triggers, \
     approval_progress, implementation_progress, progress, required_documents, items, \
     team_members, start_date, end_date, version, created_at, updated_at";

/// Provides persistence for the project aggregate.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a fully-constructed aggregate, returning the stored row.
    ///
    /// `id`, `version` and the timestamps are assigned by the database.
    pub async fn insert(pool: &PgPool, project: &Project) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (code, name, description, scope, department_id, created_by,
                budget, actual_cost, budget_threshold, requires_budget_allocation,
                requires_compliance, status, workflow_phase, workflow_step, workflow_history,
                approval_chain, workflow_triggers, approval_progress, implementation_progress,
                progress, required_documents, items, team_members, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&project.code)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.scope.as_str())
            .bind(project.department_id)
            .bind(project.created_by)
            .bind(project.budget)
            .bind(project.actual_cost)
            .bind(project.budget_threshold.as_str())
            .bind(project.requires_budget_allocation)
            .bind(project.requires_compliance)
            .bind(project.status.as_str())
            .bind(project.workflow_phase.as_str())
            .bind(project.workflow_step as i32)
            .bind(Json(&project.workflow_history))
            .bind(Json(&project.approval_chain))
            .bind(Json(&project.workflow_triggers))
            .bind(project.approval_progress)
            .bind(project.implementation_progress)
            .bind(project.progress)
            .bind(Json(&project.required_documents))
            .bind(Json(&project.items))
            .bind(Json(&project.team_members))
            .bind(project.start_date)
            .bind(project.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its public code.
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE code = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Persist mutations to an aggregate, guarded by the version the
    /// caller loaded.
    ///
    /// Returns `false` when the row was modified concurrently (version
    /// mismatch) or no longer exists.
    pub async fn save(pool: &PgPool, project: &Project) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET
                actual_cost = $3,
                status = $4,
                workflow_phase = $5,
                workflow_step = $6,
                workflow_history = $7,
                approval_chain = $8,
                workflow_triggers = $9,
                approval_progress = $10,
                implementation_progress = $11,
                progress = $12,
                required_documents = $13,
                items = $14,
                team_members = $15,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND version = $2",
        )
        .bind(project.id)
        .bind(project.version)
        .bind(project.actual_cost)
        .bind(project.status.as_str())
        .bind(project.workflow_phase.as_str())
        .bind(project.workflow_step as i32)
        .bind(Json(&project.workflow_history))
        .bind(Json(&project.approval_chain))
        .bind(Json(&project.workflow_triggers))
        .bind(project.approval_progress)
        .bind(project.implementation_progress)
        .bind(project.progress)
        .bind(Json(&project.required_documents))
        .bind(Json(&project.items))
        .bind(Json(&project.team_members))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all projects ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC");
        sqlx::query_as::<_, ProjectRow>(&query).fetch_all(pool).await
    }

    /// List projects belonging to a department.
    pub async fn list_by_department(
        pool: &PgPool,
        department_id: DbId,
    ) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE department_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(department_id)
            .fetch_all(pool)
            .await
    }

    /// List projects in the given status, oldest first. Pending statuses
    /// drive approver work queues.
    pub async fn list_pending_for(
        pool: &PgPool,
        status: &str,
    ) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM projects WHERE status = $1 ORDER BY created_at ASC");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Reserve the next sequence number for a code prefix within a year.
    ///
    /// Atomic under concurrency: the UPSERT increments the counter row
    /// and returns the reserved value in one statement.
    pub async fn next_code_seq(pool: &PgPool, prefix: &str, year: i32) -> Result<i64, sqlx::Error> {
        let (seq,): (i64,) = sqlx::query_as(
            "INSERT INTO code_counters (prefix, year, seq) VALUES ($1, $2, 1)
             ON CONFLICT (prefix, year) DO UPDATE SET seq = code_counters.seq + 1
             RETURNING seq",
        )
        .bind(prefix)
        .bind(year)
        .fetch_one(pool)
        .await?;
        Ok(seq)
    }
}
