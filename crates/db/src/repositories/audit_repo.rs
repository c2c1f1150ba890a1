//! Repository for the `audit_log` table.

use procura_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::audit::{AuditEntry, CreateAuditEntry};

const COLUMNS: &str = "id, entity_type, entity_id, action, actor_user_id, detail, created_at";

/// Append-only audit trail.
pub struct AuditRepo;

impl AuditRepo {
    pub async fn append(pool: &PgPool, input: &CreateAuditEntry) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log (entity_type, entity_id, action, actor_user_id, detail)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.action)
            .bind(input.actor_user_id)
            .bind(Json(&input.detail))
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_log
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY created_at"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
