//! Two-phase progress calculation.
//!
//! Personal-scope projects use the newer split: an approval-phase
//! percentage (documents + chain) followed by an implementation-phase
//! percentage (task completion). Departmental and external projects keep
//! the legacy flat weighted sum over documents, chain, and workflow
//! trigger milestones. Callers branch on project scope; the two formulas
//! are deliberately kept separate.

use crate::triggers::WorkflowTriggers;
use crate::types::{ProjectScope, ProjectStatus};

/// Weight of document submission within the approval percentage.
pub const APPROVAL_DOC_WEIGHT: f64 = 20.0;

/// Weight of chain approval within the approval percentage.
pub const APPROVAL_CHAIN_WEIGHT: f64 = 80.0;

/// Legacy formula weights: documents / chain / trigger milestones.
pub const LEGACY_DOC_WEIGHT: f64 = 25.0;
pub const LEGACY_CHAIN_WEIGHT: f64 = 35.0;
pub const LEGACY_MILESTONE_WEIGHT: f64 = 40.0;

/// Task counts supplied by the external task collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: u32,
    pub completed: u32,
}

/// `numerator / denominator`, defined as 0 when the denominator is 0.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Approval-phase percentage: 20% document submission + 80% chain approval.
pub fn approval_progress(
    submitted_docs: usize,
    total_docs: usize,
    approved_steps: usize,
    total_steps: usize,
) -> f64 {
    APPROVAL_DOC_WEIGHT * ratio(submitted_docs, total_docs)
        + APPROVAL_CHAIN_WEIGHT * ratio(approved_steps, total_steps)
}

/// Implementation-phase percentage.
///
/// Stays 0 until the project status enters the implementation family,
/// even if tasks already exist. 0 when no tasks exist yet.
pub fn implementation_progress(status: ProjectStatus, tasks: Option<TaskCounts>) -> f64 {
    if !status.counts_implementation_progress() {
        return 0.0;
    }
    match tasks {
        Some(t) if t.total > 0 => 100.0 * t.completed as f64 / t.total as f64,
        _ => 0.0,
    }
}

/// Overall progress for personal-scope projects.
///
/// While approval is incomplete the overall number tracks it directly;
/// once approval reaches 100 the implementation percentage folds into
/// the top of the scale, capped at 100.
pub fn personal_overall(approval: f64, implementation: f64) -> f64 {
    if approval < 100.0 {
        approval
    } else {
        (100.0 + implementation * 0.5).min(100.0)
    }
}

/// Milestone completion ratio for the legacy formula's 40-point block.
///
/// External projects earn the block through the inventory, procurement,
/// and (when required) compliance trigger completions. Departmental spend
/// is reimbursed rather than procured, so the block is earned wholesale
/// when the project reaches implementation.
pub fn legacy_milestone_ratio(
    scope: ProjectScope,
    triggers: &WorkflowTriggers,
    compliance_required: bool,
    reached_implementation: bool,
) -> f64 {
    match scope {
        ProjectScope::External => {
            let (inv_w, proc_w, comp_w) = if compliance_required {
                (0.4, 0.4, 0.2)
            } else {
                (0.5, 0.5, 0.0)
            };
            let mut earned = 0.0;
            if triggers.inventory.is_completed() {
                earned += inv_w;
            }
            if triggers.procurement.is_completed() {
                earned += proc_w;
            }
            if compliance_required && triggers.compliance.is_completed() {
                earned += comp_w;
            }
            earned
        }
        ProjectScope::Departmental => {
            if reached_implementation {
                1.0
            } else {
                0.0
            }
        }
        // Personal projects use the two-phase path, not this one.
        ProjectScope::Personal => 0.0,
    }
}

/// Legacy flat weighted sum for departmental/external projects.
pub fn legacy_overall(doc_ratio: f64, chain_ratio: f64, milestone_ratio: f64) -> f64 {
    LEGACY_DOC_WEIGHT * doc_ratio
        + LEGACY_CHAIN_WEIGHT * chain_ratio
        + LEGACY_MILESTONE_WEIGHT * milestone_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::TriggerStamp;
    use chrono::Utc;

    fn stamp() -> TriggerStamp {
        TriggerStamp { by: 1, at: Utc::now() }
    }

    #[test]
    fn approval_progress_zero_with_nothing() {
        assert_eq!(approval_progress(0, 0, 0, 0), 0.0);
    }

    #[test]
    fn approval_progress_is_80_when_all_steps_and_no_docs() {
        assert_eq!(approval_progress(0, 0, 3, 3), 80.0);
    }

    #[test]
    fn approval_progress_is_100_when_everything_done() {
        assert_eq!(approval_progress(2, 2, 4, 4), 100.0);
    }

    #[test]
    fn approval_progress_partial_chain() {
        // 20 * 1 + 80 * 0.5
        assert_eq!(approval_progress(1, 1, 2, 4), 60.0);
    }

    #[test]
    fn implementation_progress_zero_while_planning() {
        let tasks = Some(TaskCounts { total: 4, completed: 4 });
        assert_eq!(implementation_progress(ProjectStatus::Planning, tasks), 0.0);
    }

    #[test]
    fn implementation_progress_tracks_task_ratio() {
        let tasks = Some(TaskCounts { total: 4, completed: 1 });
        assert_eq!(
            implementation_progress(ProjectStatus::Implementation, tasks),
            25.0
        );
    }

    #[test]
    fn implementation_progress_zero_with_no_tasks() {
        assert_eq!(
            implementation_progress(ProjectStatus::Implementation, None),
            0.0
        );
        assert_eq!(
            implementation_progress(
                ProjectStatus::InProgress,
                Some(TaskCounts { total: 0, completed: 0 })
            ),
            0.0
        );
    }

    #[test]
    fn personal_overall_tracks_approval_until_complete() {
        assert_eq!(personal_overall(60.0, 0.0), 60.0);
        assert_eq!(personal_overall(99.9, 50.0), 99.9);
    }

    #[test]
    fn personal_overall_caps_at_100_once_approved() {
        assert_eq!(personal_overall(100.0, 0.0), 100.0);
        assert_eq!(personal_overall(100.0, 100.0), 100.0);
    }

    #[test]
    fn legacy_external_milestones_weighted() {
        let mut triggers = WorkflowTriggers::default();
        triggers.inventory.start(stamp());
        triggers.inventory.complete(stamp(), "inventory").unwrap();

        let ratio = legacy_milestone_ratio(ProjectScope::External, &triggers, true, false);
        assert!((ratio - 0.4).abs() < 1e-9);

        triggers.procurement.start(stamp());
        triggers.procurement.complete(stamp(), "procurement").unwrap();
        triggers.compliance.start(stamp());
        triggers.compliance.complete(stamp(), "compliance").unwrap();
        let ratio = legacy_milestone_ratio(ProjectScope::External, &triggers, true, false);
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn legacy_external_without_compliance_splits_evenly() {
        let mut triggers = WorkflowTriggers::default();
        triggers.procurement.start(stamp());
        triggers.procurement.complete(stamp(), "procurement").unwrap();
        let ratio = legacy_milestone_ratio(ProjectScope::External, &triggers, false, false);
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn legacy_departmental_block_earned_at_implementation() {
        let triggers = WorkflowTriggers::default();
        assert_eq!(
            legacy_milestone_ratio(ProjectScope::Departmental, &triggers, false, false),
            0.0
        );
        assert_eq!(
            legacy_milestone_ratio(ProjectScope::Departmental, &triggers, false, true),
            1.0
        );
    }

    #[test]
    fn legacy_overall_sums_weighted_blocks() {
        assert_eq!(legacy_overall(1.0, 1.0, 1.0), 100.0);
        assert_eq!(legacy_overall(1.0, 0.0, 0.0), 25.0);
        assert_eq!(legacy_overall(0.0, 1.0, 0.0), 35.0);
        assert_eq!(legacy_overall(0.0, 0.0, 1.0), 40.0);
    }
}
