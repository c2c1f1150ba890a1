//! Repository for the `procurement_orders` table.

use procura_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::procurement::{CreateProcurementOrder, ProcurementOrder};

const COLUMNS: &str =
    "id, code, project_id, status, line_items, total, created_by, created_at, updated_at";

/// Provides CRUD operations for procurement orders.
pub struct ProcurementRepo;

impl ProcurementRepo {
    /// Insert an order under a pre-reserved code.
    pub async fn create(
        pool: &PgPool,
        code: &str,
        input: &CreateProcurementOrder,
    ) -> Result<ProcurementOrder, sqlx::Error> {
        let query = format!(
            "INSERT INTO procurement_orders (code, project_id, status, line_items, total,
                created_by)
             VALUES ($1, $2, 'pending', $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProcurementOrder>(&query)
            .bind(code)
            .bind(input.project_id)
            .bind(Json(&input.line_items))
            .bind(input.total)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProcurementOrder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM procurement_orders WHERE id = $1");
        sqlx::query_as::<_, ProcurementOrder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProcurementOrder>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM procurement_orders WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, ProcurementOrder>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Move an order to a new status. Returns the updated row, or `None`
    /// if the order does not exist.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<ProcurementOrder>, sqlx::Error> {
        let query = format!(
            "UPDATE procurement_orders SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProcurementOrder>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
