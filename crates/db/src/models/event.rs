//! Persisted domain event rows (outbox).

use procura_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `events` table.
///
/// Every event published on the bus is appended here so consumers that
/// were offline can replay.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventRow {
    pub id: DbId,
    pub event_name: String,
    pub project_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: Json<serde_json::Value>,
    pub created_at: Timestamp,
}
