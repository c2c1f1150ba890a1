//! Repository for the `approval_requests` table.

use procura_core::approval_request::ApprovalRequest;
use procura_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::approval_request::{ApprovalRequestRow, CreateApprovalRequest};

const COLUMNS: &str = "id, entity_type, entity_id, requested_by, chain, current_level, status, \
     created_at, updated_at";

/// Provides persistence for generic approval requests.
pub struct ApprovalRequestRepo;

impl ApprovalRequestRepo {
    /// Open a request with a freshly-built chain.
    pub async fn create(
        pool: &PgPool,
        input: &CreateApprovalRequest,
    ) -> Result<ApprovalRequestRow, sqlx::Error> {
        let now = chrono::Utc::now();
        let request = ApprovalRequest::new(
            0,
            input.entity_type.clone(),
            input.entity_id,
            input.requested_by,
            input.chain_roles.clone(),
            now,
        );
        let query = format!(
            "INSERT INTO approval_requests
                (entity_type, entity_id, requested_by, chain, current_level, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRequestRow>(&query)
            .bind(&request.entity_type)
            .bind(request.entity_id)
            .bind(request.requested_by)
            .bind(Json(&request.chain))
            .bind(request.current_level as i32)
            .bind(request.status.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ApprovalRequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_requests WHERE id = $1");
        sqlx::query_as::<_, ApprovalRequestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Persist a decided request.
    pub async fn save(pool: &PgPool, request: &ApprovalRequest) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE approval_requests SET
                chain = $2, current_level = $3, status = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(request.id)
        .bind(Json(&request.chain))
        .bind(request.current_level as i32)
        .bind(request.status.as_str())
        .bind(request.updated_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_pending(pool: &PgPool) -> Result<Vec<ApprovalRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_requests WHERE status = 'pending' ORDER BY created_at"
        );
        sqlx::query_as::<_, ApprovalRequestRow>(&query)
            .fetch_all(pool)
            .await
    }
}
