//! Procurement order model.

use procura_core::project::ProjectItem;
use procura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Procurement order lifecycle states.
pub const ORDER_PENDING: &str = "pending";
pub const ORDER_DELIVERED: &str = "delivered";
pub const ORDER_CANCELLED: &str = "cancelled";

/// A row from the `procurement_orders` table.
///
/// Line items are stored verbatim as the project's itemized requirements.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProcurementOrder {
    pub id: DbId,
    /// Sequential year-scoped code (`PO-2026-0001`).
    pub code: String,
    pub project_id: DbId,
    pub status: String,
    pub line_items: Json<Vec<ProjectItem>>,
    pub total: i64,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a procurement order (code is generated on insert).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProcurementOrder {
    pub project_id: DbId,
    pub line_items: Vec<ProjectItem>,
    pub total: i64,
    pub created_by: DbId,
}
