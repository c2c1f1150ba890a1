//! Notification row model.

use procura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub data: Json<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub recipient_user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub data: serde_json::Value,
}
