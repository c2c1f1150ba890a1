//! Repository for the `users` table.

use procura_core::types::DbId;
use sqlx::PgPool;

use crate::models::directory::User;

const COLUMNS: &str = "id, name, email, department_id, role_level, created_at";

/// Lookup operations for users.
pub struct UserRepo;

impl UserRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_department(
        pool: &PgPool,
        department_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE department_id = $1 ORDER BY name");
        sqlx::query_as::<_, User>(&query)
            .bind(department_id)
            .fetch_all(pool)
            .await
    }
}
