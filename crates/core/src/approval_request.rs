//! Generic department-hierarchy approval requests.
//!
//! Non-project approvable entities go through this simpler level-indexed
//! chain with a `current_level` pointer. The progression invariant is the
//! same as the project chain: monotonic, single current level.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::types::{DbId, StepStatus, Timestamp};

/// Overall status of a generic approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(WorkflowError::Validation(format!(
                "unknown request status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level in a generic approval chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalChainLevel {
    pub level: u32,
    pub role: String,
    pub approver: Option<DbId>,
    pub status: StepStatus,
    pub comments: Option<String>,
    pub decided_at: Option<Timestamp>,
}

/// A generic approval request over an arbitrary entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub requested_by: DbId,
    pub chain: Vec<ApprovalChainLevel>,
    /// 1-based pointer to the level currently awaiting a decision.
    pub current_level: u32,
    pub status: RequestStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ApprovalRequest {
    /// Create a request with a chain built from ordered role names.
    pub fn new(
        id: DbId,
        entity_type: impl Into<String>,
        entity_id: DbId,
        requested_by: DbId,
        roles: Vec<String>,
        now: Timestamp,
    ) -> Self {
        let chain = roles
            .into_iter()
            .enumerate()
            .map(|(i, role)| ApprovalChainLevel {
                level: i as u32 + 1,
                role,
                approver: None,
                status: StepStatus::Pending,
                comments: None,
                decided_at: None,
            })
            .collect();
        ApprovalRequest {
            id,
            entity_type: entity_type.into(),
            entity_id,
            requested_by,
            chain,
            current_level: 1,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn level_entry(&mut self, level: u32) -> Result<&mut ApprovalChainLevel, WorkflowError> {
        if self.status != RequestStatus::Pending {
            return Err(WorkflowError::InvalidState(format!(
                "approval request is already {}",
                self.status
            )));
        }
        if level != self.current_level {
            return Err(WorkflowError::InvalidState(format!(
                "level {level} is not current; awaiting level {}",
                self.current_level
            )));
        }
        self.chain
            .iter_mut()
            .find(|l| l.level == level)
            .ok_or_else(|| WorkflowError::not_found("approval level", level))
    }

    /// Approve the current level, advancing the pointer or completing the
    /// request.
    pub fn approve(
        &mut self,
        approver: DbId,
        level: u32,
        comments: Option<String>,
        now: Timestamp,
    ) -> Result<(), WorkflowError> {
        let entry = self.level_entry(level)?;
        entry.status = StepStatus::Approved;
        entry.approver = Some(approver);
        entry.comments = comments;
        entry.decided_at = Some(now);

        if self.chain.iter().all(|l| l.status == StepStatus::Approved) {
            self.status = RequestStatus::Approved;
        } else {
            self.current_level += 1;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Reject the current level; terminal for the request.
    pub fn reject(
        &mut self,
        rejecter: DbId,
        level: u32,
        comments: Option<String>,
        now: Timestamp,
    ) -> Result<(), WorkflowError> {
        let entry = self.level_entry(level)?;
        entry.status = StepStatus::Rejected;
        entry.approver = Some(rejecter);
        entry.comments = comments;
        entry.decided_at = Some(now);
        self.status = RequestStatus::Rejected;
        self.updated_at = now;
        Ok(())
    }
}
