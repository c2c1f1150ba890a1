//! The project aggregate and its workflow transitions.
//!
//! All approval-chain execution, phase movement, and resubmission logic
//! lives here as synchronous methods. Each transition validates the
//! single-current-step invariant, mutates the aggregate, appends to the
//! append-only workflow history, recalculates progress, and returns the
//! [`DomainEvent`]s the orchestration layer must dispatch.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::chain::ApprovalStep;
use crate::error::WorkflowError;
use crate::events::DomainEvent;
use crate::phase;
use crate::progress::{self, TaskCounts};
use crate::triggers::{TriggerStamp, WorkflowTriggers};
use crate::types::{
    ApprovalLevel, BudgetThreshold, DbId, ProjectScope, ProjectStatus, StepStatus, Timestamp,
    WorkflowPhase,
};

/// History entry action names.
pub mod actions {
    pub const STEP_APPROVED: &str = "step_approved";
    pub const STEP_REJECTED: &str = "step_rejected";
    pub const RESUBMITTED: &str = "resubmitted";
    pub const PHASE_PROGRESSED: &str = "phase_progressed";
    pub const TRIGGER_FIRED: &str = "trigger_fired";
    pub const TRIGGER_COMPLETED: &str = "trigger_completed";
    pub const BUDGET_ALLOCATED: &str = "budget_allocated";
    pub const TEAM_MEMBER_ADDED: &str = "team_member_added";
    pub const TEAM_MEMBER_REMOVED: &str = "team_member_removed";
}

// ---------------------------------------------------------------------------
// Embedded records
// ---------------------------------------------------------------------------

/// One uploaded revision of a required document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub version: u32,
    pub file_ref: String,
    pub uploaded_by: DbId,
    pub uploaded_at: Timestamp,
}

/// A document the approval process requires, tracked independently of the
/// chain but feeding into the approval-phase percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredDocument {
    pub document_type: String,
    pub is_submitted: bool,
    pub submitted_at: Option<Timestamp>,
    pub approval_status: StepStatus,
    pub versions: Vec<DocumentVersion>,
}

impl RequiredDocument {
    pub fn new(document_type: impl Into<String>) -> Self {
        RequiredDocument {
            document_type: document_type.into(),
            is_submitted: false,
            submitted_at: None,
            approval_status: StepStatus::Pending,
            versions: Vec::new(),
        }
    }
}

/// Soft-removable project team membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: DbId,
    pub role: String,
    pub is_active: bool,
}

/// One itemized requirement; procurement line items are taken verbatim
/// from these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_cost: i64,
    pub category: String,
}

impl ProjectItem {
    pub fn total(&self) -> i64 {
        self.quantity * self.unit_cost
    }
}

/// Append-only audit trail entry for workflow movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowHistoryEntry {
    pub phase: WorkflowPhase,
    pub action: String,
    pub triggered_by: DbId,
    pub metadata: serde_json::Value,
    pub timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The central project entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    /// Department-prefixed, year-scoped, sequential (e.g. `ENG-2026-0042`).
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub scope: ProjectScope,
    pub department_id: DbId,
    pub created_by: DbId,

    pub budget: i64,
    pub actual_cost: i64,
    pub budget_threshold: BudgetThreshold,
    pub requires_budget_allocation: bool,
    pub requires_compliance: bool,

    pub status: ProjectStatus,
    pub workflow_phase: WorkflowPhase,
    /// Monotonically incrementing transition counter.
    pub workflow_step: u32,
    pub workflow_history: Vec<WorkflowHistoryEntry>,

    pub approval_chain: Vec<ApprovalStep>,
    pub workflow_triggers: WorkflowTriggers,

    pub approval_progress: f64,
    pub implementation_progress: f64,
    pub progress: f64,

    pub required_documents: Vec<RequiredDocument>,
    pub items: Vec<ProjectItem>,
    pub team_members: Vec<TeamMember>,

    pub start_date: Timestamp,
    pub end_date: Timestamp,

    /// Optimistic concurrency version; bumped by the store on save.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Build a fresh project in the planning phase with an empty chain.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DbId,
        code: String,
        name: String,
        scope: ProjectScope,
        department_id: DbId,
        created_by: DbId,
        budget: i64,
        budget_threshold: BudgetThreshold,
        requires_budget_allocation: bool,
        requires_compliance: bool,
        start_date: Timestamp,
        end_date: Timestamp,
        now: Timestamp,
    ) -> Self {
        Project {
            id,
            code,
            name,
            description: None,
            scope,
            department_id,
            created_by,
            budget,
            actual_cost: 0,
            budget_threshold,
            requires_budget_allocation,
            requires_compliance,
            status: ProjectStatus::Planning,
            workflow_phase: WorkflowPhase::Planning,
            workflow_step: 0,
            workflow_history: Vec::new(),
            approval_chain: Vec::new(),
            workflow_triggers: WorkflowTriggers::default(),
            approval_progress: 0.0,
            implementation_progress: 0.0,
            progress: 0.0,
            required_documents: Vec::new(),
            items: Vec::new(),
            team_members: Vec::new(),
            start_date,
            end_date,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// The single current step: first pending in chain order.
    pub fn current_step(&self) -> Option<&ApprovalStep> {
        self.approval_chain.iter().find(|s| s.is_pending())
    }

    /// Sum of itemized requirements, falling back to the budget when the
    /// project has no items.
    pub fn itemized_total(&self) -> i64 {
        if self.items.is_empty() {
            self.budget
        } else {
            self.items.iter().map(ProjectItem::total).sum()
        }
    }

    fn record_history(
        &mut self,
        action: &str,
        triggered_by: DbId,
        metadata: serde_json::Value,
        now: Timestamp,
    ) {
        self.workflow_step += 1;
        self.workflow_history.push(WorkflowHistoryEntry {
            phase: self.workflow_phase,
            action: action.to_string(),
            triggered_by,
            metadata,
            timestamp: now,
        });
        self.updated_at = now;
    }

    // -----------------------------------------------------------------------
    // Chain execution
    // -----------------------------------------------------------------------

    /// Locate the pending step at `level`, enforcing the single-current-step
    /// invariant.
    fn pending_step_index(&self, level: ApprovalLevel) -> Result<usize, WorkflowError> {
        let step_idx = self
            .approval_chain
            .iter()
            .position(|s| s.is_pending() && s.level == level)
            .ok_or_else(|| WorkflowError::not_found("approval step", level))?;
        // First pending step exists because step_idx is itself pending.
        let current_idx = self
            .approval_chain
            .iter()
            .position(|s| s.is_pending())
            .unwrap_or(step_idx);
        if step_idx != current_idx {
            let current = self.approval_chain[current_idx].level;
            return Err(WorkflowError::InvalidState(format!(
                "step '{level}' is not the current step; awaiting '{current}' approval"
            )));
        }
        Ok(step_idx)
    }

    /// Approve the current pending step at `level`.
    pub fn approve_step(
        &mut self,
        approver: DbId,
        level: ApprovalLevel,
        comments: Option<String>,
        now: Timestamp,
    ) -> Result<Vec<DomainEvent>, WorkflowError> {
        let idx = self.pending_step_index(level)?;
        let step = &mut self.approval_chain[idx];
        step.status = StepStatus::Approved;
        step.approver = Some(approver);
        step.comments = comments;
        step.approved_at = Some(now);

        let mut events = vec![DomainEvent::StepApproved { level, approver }];

        if level == ApprovalLevel::BudgetAllocation {
            self.workflow_triggers.budget_allocation_approved =
                Some(TriggerStamp { by: approver, at: now });
        }
        if level == ApprovalLevel::LegalCompliance {
            events.push(DomainEvent::BudgetReviewRequested);
        }

        let next = self
            .approval_chain
            .iter()
            .find(|s| s.required && s.is_pending() && s.level != ApprovalLevel::BudgetAllocation);
        match next {
            Some(next) => {
                self.status = next.level.pending_status();
                events.push(DomainEvent::ApprovalAdvanced {
                    next_level: next.level,
                    next_department_id: next.department_id,
                });
            }
            None => {
                let allocation_satisfied =
                    self.workflow_triggers.budget_allocation_approved.is_some();
                if self.requires_budget_allocation && !allocation_satisfied {
                    self.status = ProjectStatus::PendingBudgetAllocation;
                    events.push(DomainEvent::BudgetAllocationPending {
                        total: self.itemized_total(),
                    });
                } else {
                    self.status = ProjectStatus::Approved;
                    events.push(DomainEvent::ChainCompleted);
                }
            }
        }

        self.record_history(
            actions::STEP_APPROVED,
            approver,
            json!({ "level": level, "status": self.status }),
            now,
        );
        self.recalculate_progress(None);
        Ok(events)
    }

    /// Reject the current pending step at `level`.
    ///
    /// Subsequent steps are left untouched; the project is terminal until
    /// resubmission.
    pub fn reject_step(
        &mut self,
        rejecter: DbId,
        level: ApprovalLevel,
        comments: Option<String>,
        now: Timestamp,
    ) -> Result<Vec<DomainEvent>, WorkflowError> {
        let idx = self.pending_step_index(level)?;
        let step = &mut self.approval_chain[idx];
        step.status = StepStatus::Rejected;
        step.approver = Some(rejecter);
        step.comments = comments.clone();
        step.approved_at = Some(now);

        self.status = ProjectStatus::RevisionRequired;
        self.record_history(
            actions::STEP_REJECTED,
            rejecter,
            json!({ "level": level }),
            now,
        );
        self.recalculate_progress(None);
        Ok(vec![DomainEvent::StepRejected {
            level,
            rejecter,
            comments,
        }])
    }

    // -----------------------------------------------------------------------
    // Resubmission
    // -----------------------------------------------------------------------

    /// Rewind the rejected step and everything after it to pending,
    /// preserving earlier approvals.
    pub fn resubmit(
        &mut self,
        resubmitted_by: DbId,
        now: Timestamp,
    ) -> Result<Vec<DomainEvent>, WorkflowError> {
        if self.status != ProjectStatus::RevisionRequired {
            return Err(WorkflowError::InvalidState(format!(
                "project can only be resubmitted from 'revision_required', current status is '{}'",
                self.status
            )));
        }
        let rejected_idx = self
            .approval_chain
            .iter()
            .position(|s| s.status == StepStatus::Rejected)
            .ok_or_else(|| {
                WorkflowError::InvalidState(
                    "project requires revision but has no rejected step".to_string(),
                )
            })?;

        for step in &mut self.approval_chain[rejected_idx..] {
            step.status = StepStatus::Pending;
            step.approver = None;
            step.comments = None;
            step.approved_at = None;
        }

        let first_pending = self.approval_chain[rejected_idx].level;
        self.status = first_pending.pending_status();
        self.record_history(
            actions::RESUBMITTED,
            resubmitted_by,
            json!({
                "preserved_approvals": rejected_idx,
                "reset_from": first_pending,
            }),
            now,
        );
        self.recalculate_progress(None);
        Ok(vec![DomainEvent::Resubmitted {
            first_pending,
            preserved_approvals: rejected_idx,
        }])
    }

    /// Append a dispatcher-driven entry to the workflow history.
    pub fn record_trigger(
        &mut self,
        action: &str,
        triggered_by: DbId,
        metadata: serde_json::Value,
        now: Timestamp,
    ) {
        self.record_history(action, triggered_by, metadata, now);
    }

    /// Record an out-of-chain budget allocation decision in the history.
    ///
    /// Used when allocation is granted through the external flow rather
    /// than a chain step; the caller sets the trigger stamp itself.
    pub fn record_budget_allocation(&mut self, approver: DbId, now: Timestamp) {
        self.record_history(
            actions::BUDGET_ALLOCATED,
            approver,
            json!({ "status": self.status }),
            now,
        );
    }

    // -----------------------------------------------------------------------
    // Phase movement
    // -----------------------------------------------------------------------

    /// Advance the workflow phase, recording the transition.
    pub fn progress_phase(
        &mut self,
        new_phase: WorkflowPhase,
        action: &str,
        triggered_by: DbId,
        metadata: serde_json::Value,
        now: Timestamp,
    ) -> Result<Vec<DomainEvent>, WorkflowError> {
        phase::validate_transition(self.workflow_phase, new_phase)?;
        let from = self.workflow_phase;
        self.workflow_phase = new_phase;
        self.record_history(action, triggered_by, metadata, now);
        Ok(vec![DomainEvent::PhaseAdvanced { from, to: new_phase }])
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Recompute the two-phase progress numbers.
    ///
    /// `tasks` is the count snapshot from the task collaborator; pass
    /// `None` when tasks have not been queried (the implementation number
    /// then falls back to 0 for statuses where it counts).
    pub fn recalculate_progress(&mut self, tasks: Option<TaskCounts>) {
        let total_docs = self.required_documents.len();
        let submitted_docs = self
            .required_documents
            .iter()
            .filter(|d| d.is_submitted)
            .count();
        let total_steps = self.approval_chain.len();
        let approved_steps = self
            .approval_chain
            .iter()
            .filter(|s| s.status == StepStatus::Approved)
            .count();

        self.approval_progress =
            progress::approval_progress(submitted_docs, total_docs, approved_steps, total_steps);
        self.implementation_progress = progress::implementation_progress(self.status, tasks);

        self.progress = match self.scope {
            ProjectScope::Personal => {
                progress::personal_overall(self.approval_progress, self.implementation_progress)
            }
            ProjectScope::Departmental | ProjectScope::External => {
                let doc_ratio = if total_docs == 0 {
                    0.0
                } else {
                    submitted_docs as f64 / total_docs as f64
                };
                let chain_ratio = if total_steps == 0 {
                    0.0
                } else {
                    approved_steps as f64 / total_steps as f64
                };
                let reached_implementation =
                    self.workflow_phase.ordinal() >= WorkflowPhase::Implementation.ordinal();
                let milestone = progress::legacy_milestone_ratio(
                    self.scope,
                    &self.workflow_triggers,
                    self.requires_compliance,
                    reached_implementation,
                );
                progress::legacy_overall(doc_ratio, chain_ratio, milestone)
            }
        };
    }

    // -----------------------------------------------------------------------
    // Documents & team
    // -----------------------------------------------------------------------

    /// Record a new version of a required document and mark it submitted.
    pub fn submit_document(
        &mut self,
        document_type: &str,
        file_ref: String,
        uploaded_by: DbId,
        now: Timestamp,
    ) -> Result<(), WorkflowError> {
        let doc = self
            .required_documents
            .iter_mut()
            .find(|d| d.document_type == document_type)
            .ok_or_else(|| WorkflowError::NotFound {
                entity: "required document",
                id: document_type.to_string(),
            })?;
        let version = doc.versions.len() as u32 + 1;
        doc.versions.push(DocumentVersion {
            version,
            file_ref,
            uploaded_by,
            uploaded_at: now,
        });
        doc.is_submitted = true;
        doc.submitted_at = Some(now);
        self.updated_at = now;
        self.recalculate_progress(None);
        Ok(())
    }

    /// Add a team member; reactivates a previously removed membership.
    pub fn add_team_member(&mut self, user_id: DbId, role: impl Into<String>) {
        if let Some(member) = self.team_members.iter_mut().find(|m| m.user_id == user_id) {
            member.is_active = true;
            member.role = role.into();
        } else {
            self.team_members.push(TeamMember {
                user_id,
                role: role.into(),
                is_active: true,
            });
        }
    }

    /// Soft-remove a team member. Returns `false` if no active membership
    /// existed.
    pub fn remove_team_member(&mut self, user_id: DbId) -> bool {
        match self
            .team_members
            .iter_mut()
            .find(|m| m.user_id == user_id && m.is_active)
        {
            Some(member) => {
                member.is_active = false;
                true
            }
            None => false,
        }
    }
}
