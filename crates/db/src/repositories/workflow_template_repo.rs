//! Repository for the `workflow_templates` table.

use procura_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::workflow_template::{CreateWorkflowTemplate, WorkflowTemplateRow};

const COLUMNS: &str =
    "id, name, document_type, category, steps, is_active, created_at, updated_at";

/// Provides CRUD operations for workflow templates.
pub struct WorkflowTemplateRepo;

impl WorkflowTemplateRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateWorkflowTemplate,
    ) -> Result<WorkflowTemplateRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_templates (name, document_type, category, steps, is_active)
             VALUES ($1, $2, $3, $4, TRUE)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowTemplateRow>(&query)
            .bind(&input.name)
            .bind(&input.document_type)
            .bind(&input.category)
            .bind(Json(&input.steps))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkflowTemplateRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_templates WHERE id = $1");
        sqlx::query_as::<_, WorkflowTemplateRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active templates for a document type, most specific (categorized)
    /// first.
    pub async fn find_active(
        pool: &PgPool,
        document_type: &str,
    ) -> Result<Vec<WorkflowTemplateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_templates
             WHERE document_type = $1 AND is_active = TRUE
             ORDER BY category NULLS LAST, id"
        );
        sqlx::query_as::<_, WorkflowTemplateRow>(&query)
            .bind(document_type)
            .fetch_all(pool)
            .await
    }

    /// Deactivate a template. Returns `true` if a row changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workflow_templates SET is_active = FALSE, updated_at = NOW()
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
