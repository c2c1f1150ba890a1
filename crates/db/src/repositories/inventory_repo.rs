//! Repository for the `inventory_items` table.

use procura_core::types::DbId;
use sqlx::PgPool;

use crate::models::inventory::{CreateInventoryItem, InventoryItem};

const COLUMNS: &str = "id, code, name, category, quantity, unit_cost, total_value, project_id, \
     status, created_by, created_at, updated_at";

/// Provides CRUD operations for inventory items.
pub struct InventoryRepo;

impl InventoryRepo {
    /// Insert an inventory item under a pre-reserved code.
    pub async fn create(
        pool: &PgPool,
        code: &str,
        input: &CreateInventoryItem,
    ) -> Result<InventoryItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO inventory_items
                (code, name, category, quantity, unit_cost, total_value, project_id, status,
                 created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(code)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.quantity)
            .bind(input.unit_cost)
            .bind(input.quantity * input.unit_cost)
            .bind(input.project_id)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<InventoryItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inventory_items WHERE id = $1");
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<InventoryItem>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM inventory_items WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
