//! Generic approval request rows.

use procura_core::approval_request::{ApprovalChainLevel, ApprovalRequest, RequestStatus};
use procura_core::types::{DbId, Timestamp};
use procura_core::WorkflowError;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `approval_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalRequestRow {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub requested_by: DbId,
    pub chain: Json<Vec<ApprovalChainLevel>>,
    pub current_level: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ApprovalRequestRow {
    pub fn into_domain(self) -> Result<ApprovalRequest, WorkflowError> {
        let status: RequestStatus = self.status.parse()?;
        Ok(ApprovalRequest {
            id: self.id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            requested_by: self.requested_by,
            chain: self.chain.0,
            current_level: self.current_level as u32,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DTO for opening an approval request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApprovalRequest {
    pub entity_type: String,
    pub entity_id: DbId,
    pub requested_by: DbId,
    /// Role names, one per level in order.
    pub chain_roles: Vec<String>,
}
