//! Repository for the `departments` table.

use procura_core::types::DbId;
use sqlx::PgPool;

use crate::models::directory::Department;

const COLUMNS: &str = "id, name, kind, hod_user_id, created_at";

/// Lookup operations for departments.
pub struct DepartmentRepo;

impl DepartmentRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE id = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the first department of a given functional kind.
    ///
    /// Chain generation resolves the shared approval departments
    /// (project management, legal, finance, executive) this way.
    pub async fn find_by_kind(
        pool: &PgPool,
        kind: &str,
    ) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE kind = $1 ORDER BY id LIMIT 1");
        sqlx::query_as::<_, Department>(&query)
            .bind(kind)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments ORDER BY name");
        sqlx::query_as::<_, Department>(&query).fetch_all(pool).await
    }
}
