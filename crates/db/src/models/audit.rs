//! Audit log rows.

use procura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `audit_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub action: String,
    pub actor_user_id: Option<DbId>,
    pub detail: Json<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for appending an audit entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuditEntry {
    pub entity_type: String,
    pub entity_id: DbId,
    pub action: String,
    pub actor_user_id: Option<DbId>,
    pub detail: serde_json::Value,
}
