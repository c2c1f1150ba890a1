//! Repository for the `events` table (persisted bus events).

use procura_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::event::EventRow;

const COLUMNS: &str = "id, event_name, project_id, actor_user_id, payload, created_at";

/// Append and replay operations for persisted events.
pub struct EventRepo;

impl EventRepo {
    pub async fn append(
        pool: &PgPool,
        event_name: &str,
        project_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<EventRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (event_name, project_id, actor_user_id, payload)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(event_name)
            .bind(project_id)
            .bind(actor_user_id)
            .bind(Json(payload))
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<EventRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM events WHERE project_id = $1 ORDER BY created_at");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
