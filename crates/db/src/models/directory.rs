//! Department and user rows for directory resolution.

use procura_core::types::{DbId, DepartmentKind, DepartmentRef, Timestamp};
use procura_core::WorkflowError;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `departments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: DbId,
    pub name: String,
    /// Functional kind (snake_case [`DepartmentKind`] string).
    pub kind: String,
    pub hod_user_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl Department {
    /// Convert into the typed handle the domain uses.
    pub fn into_ref(self) -> Result<DepartmentRef, WorkflowError> {
        let kind: DepartmentKind = self.kind.parse()?;
        Ok(DepartmentRef {
            id: self.id,
            name: self.name,
            kind,
            hod_user_id: self.hod_user_id,
        })
    }
}

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub department_id: DbId,
    /// Administrative tier; >= 1000 bypasses approval chains.
    pub role_level: i32,
    pub created_at: Timestamp,
}
