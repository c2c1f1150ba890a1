//! Repository for the `team_members` table.

use procura_core::types::DbId;
use sqlx::PgPool;

use crate::models::team_member::{CreateTeamMember, TeamMemberRow};

const COLUMNS: &str = "id, project_id, user_id, role, is_active, created_at, updated_at";

/// Queryable side of project team membership.
pub struct TeamMemberRepo;

impl TeamMemberRepo {
    /// Add a member, reactivating a previously removed row for the same
    /// user instead of inserting a duplicate.
    pub async fn upsert(
        pool: &PgPool,
        input: &CreateTeamMember,
    ) -> Result<TeamMemberRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_members (project_id, user_id, role, is_active)
             VALUES ($1, $2, $3, TRUE)
             ON CONFLICT (project_id, user_id)
             DO UPDATE SET role = EXCLUDED.role, is_active = TRUE, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamMemberRow>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Soft-remove a member. Returns `true` if a row changed.
    pub async fn deactivate(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE team_members SET is_active = FALSE, updated_at = NOW()
             WHERE project_id = $1 AND user_id = $2 AND is_active = TRUE",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<TeamMemberRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_members
             WHERE project_id = $1 AND is_active = TRUE
             ORDER BY id"
        );
        sqlx::query_as::<_, TeamMemberRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_projects_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TeamMemberRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_members
             WHERE user_id = $1 AND is_active = TRUE
             ORDER BY id"
        );
        sqlx::query_as::<_, TeamMemberRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
