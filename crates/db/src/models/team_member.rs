//! Team membership rows.
//!
//! Membership also lives denormalized inside the project aggregate; the
//! `team_members` table is the queryable side (who is on what, across
//! projects) and is kept in sync by the repository.

use procura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `team_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMemberRow {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a member to a project team.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamMember {
    pub project_id: DbId,
    pub user_id: DbId,
    pub role: String,
}
