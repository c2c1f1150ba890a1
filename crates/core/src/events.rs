//! Domain events emitted by aggregate state transitions.
//!
//! The aggregate never performs side effects itself; each transition
//! returns the events describing what the orchestration layer should do
//! (notify the next approver, record an audit entry, publish to the bus).
//! Side-effect failures downstream never roll back the transition that
//! produced the event.

use serde::Serialize;

use crate::types::{ApprovalLevel, DbId, WorkflowPhase};

/// An event produced by a project workflow transition.
///
/// The project id is not carried here; the caller holding the aggregate
/// attaches it when dispatching.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A chain step was approved.
    StepApproved { level: ApprovalLevel, approver: DbId },

    /// A chain step was rejected; the project needs revision.
    StepRejected {
        level: ApprovalLevel,
        rejecter: DbId,
        comments: Option<String>,
    },

    /// The chain moved on; the next step's department should be notified.
    ApprovalAdvanced {
        next_level: ApprovalLevel,
        next_department_id: DbId,
    },

    /// Every required step has resolved; the project is approved.
    ChainCompleted,

    /// All review steps landed but a budget allocation is still owed;
    /// Finance should be notified with the computed total.
    BudgetAllocationPending { total: i64 },

    /// Legal signed off; Finance should be asked for budget review.
    BudgetReviewRequested,

    /// The project advanced to a later phase.
    PhaseAdvanced {
        from: WorkflowPhase,
        to: WorkflowPhase,
    },

    /// A rejected project was resubmitted; the first now-pending step's
    /// department should be notified again.
    Resubmitted {
        first_pending: ApprovalLevel,
        preserved_approvals: usize,
    },
}

impl DomainEvent {
    /// Dot-separated event name for bus envelopes and audit entries.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::StepApproved { .. } => "project.step_approved",
            DomainEvent::StepRejected { .. } => "project.step_rejected",
            DomainEvent::ApprovalAdvanced { .. } => "project.approval_advanced",
            DomainEvent::ChainCompleted => "project.chain_completed",
            DomainEvent::BudgetAllocationPending { .. } => "project.budget_allocation_pending",
            DomainEvent::BudgetReviewRequested => "project.budget_review_requested",
            DomainEvent::PhaseAdvanced { .. } => "project.phase_advanced",
            DomainEvent::Resubmitted { .. } => "project.resubmitted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_dot_separated() {
        let event = DomainEvent::ChainCompleted;
        assert_eq!(event.name(), "project.chain_completed");
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = DomainEvent::StepApproved {
            level: ApprovalLevel::Finance,
            approver: 9,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "step_approved");
        assert_eq!(json["level"], "finance");
    }
}
