//! Inventory item model.

use procura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `inventory_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InventoryItem {
    pub id: DbId,
    /// Sequential year-scoped code (`INV-2026-0001`).
    pub code: String,
    pub name: String,
    /// Unified category (see `procura_core::category`).
    pub category: String,
    pub quantity: i64,
    pub unit_cost: i64,
    pub total_value: i64,
    pub project_id: Option<DbId>,
    pub status: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an inventory record (code is generated on insert).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInventoryItem {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit_cost: i64,
    pub project_id: Option<DbId>,
    pub created_by: DbId,
}
