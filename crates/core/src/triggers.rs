//! Per-sub-workflow trigger state machines.
//!
//! Each side-effecting workflow trigger (inventory creation, procurement
//! initiation, regulatory compliance) advances through an explicit
//! NotStarted -> Started -> Completed machine instead of ad hoc boolean
//! flags, so a trigger can fire at most once and completion before start
//! is unrepresentable as a success.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::types::{DbId, Timestamp};

/// Who flipped a trigger, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerStamp {
    pub by: DbId,
    pub at: Timestamp,
}

/// State of one idempotent sub-workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TriggerState {
    NotStarted,
    Started { started: TriggerStamp },
    Completed {
        started: TriggerStamp,
        completed: TriggerStamp,
    },
}

impl Default for TriggerState {
    fn default() -> Self {
        TriggerState::NotStarted
    }
}

impl TriggerState {
    pub fn is_started(&self) -> bool {
        !matches!(self, TriggerState::NotStarted)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TriggerState::Completed { .. })
    }

    /// Fire the trigger. Returns `true` if this call started it, `false`
    /// if it had already fired (the idempotency guard).
    pub fn start(&mut self, stamp: TriggerStamp) -> bool {
        match self {
            TriggerState::NotStarted => {
                *self = TriggerState::Started { started: stamp };
                true
            }
            _ => false,
        }
    }

    /// Mark the sub-workflow complete.
    ///
    /// Completing before the trigger fired is an [`WorkflowError::InvalidState`];
    /// completing twice returns `Ok(false)` and changes nothing.
    pub fn complete(
        &mut self,
        stamp: TriggerStamp,
        name: &'static str,
    ) -> Result<bool, WorkflowError> {
        match *self {
            TriggerState::NotStarted => Err(WorkflowError::InvalidState(format!(
                "{name} cannot be completed before it is started"
            ))),
            TriggerState::Started { started } => {
                *self = TriggerState::Completed {
                    started,
                    completed: stamp,
                };
                Ok(true)
            }
            TriggerState::Completed { .. } => Ok(false),
        }
    }
}

/// All trigger machines carried by a project, plus the two one-shot
/// allocation/task flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTriggers {
    pub inventory: TriggerState,
    pub procurement: TriggerState,
    pub compliance: TriggerState,
    /// Set when the budget-allocation step (or external allocation flow)
    /// lands. Never cleared.
    pub budget_allocation_approved: Option<TriggerStamp>,
    /// Set once implementation milestone tasks have been synthesized.
    pub tasks_synthesized: Option<TriggerStamp>,
}

impl WorkflowTriggers {
    /// Regulatory compliance may only complete once both the inventory and
    /// procurement sub-workflows have completed.
    pub fn compliance_ready(&self) -> bool {
        self.inventory.is_completed() && self.procurement.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn stamp(by: DbId) -> TriggerStamp {
        TriggerStamp { by, at: Utc::now() }
    }

    #[test]
    fn start_fires_once() {
        let mut state = TriggerState::default();
        assert!(state.start(stamp(1)));
        assert!(!state.start(stamp(2)));
        assert!(state.is_started());
        assert!(!state.is_completed());
    }

    #[test]
    fn complete_before_start_is_invalid() {
        let mut state = TriggerState::default();
        let err = state.complete(stamp(1), "inventory").unwrap_err();
        assert_matches!(err, WorkflowError::InvalidState(_));
    }

    #[test]
    fn complete_after_start_succeeds_once() {
        let mut state = TriggerState::default();
        state.start(stamp(1));
        assert_eq!(state.complete(stamp(2), "inventory").unwrap(), true);
        assert_eq!(state.complete(stamp(3), "inventory").unwrap(), false);
        assert!(state.is_completed());
    }

    #[test]
    fn completed_state_keeps_both_stamps() {
        let mut state = TriggerState::default();
        let started = stamp(1);
        state.start(started);
        state.complete(stamp(2), "procurement").unwrap();
        match state {
            TriggerState::Completed { started: s, completed: c } => {
                assert_eq!(s.by, 1);
                assert_eq!(c.by, 2);
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn compliance_gated_on_inventory_and_procurement() {
        let mut triggers = WorkflowTriggers::default();
        assert!(!triggers.compliance_ready());

        triggers.inventory.start(stamp(1));
        triggers.inventory.complete(stamp(1), "inventory").unwrap();
        assert!(!triggers.compliance_ready());

        triggers.procurement.start(stamp(1));
        triggers
            .procurement
            .complete(stamp(1), "procurement")
            .unwrap();
        assert!(triggers.compliance_ready());
    }

    #[test]
    fn triggers_serialize_round_trip() {
        let mut triggers = WorkflowTriggers::default();
        triggers.inventory.start(stamp(7));
        let json = serde_json::to_string(&triggers).unwrap();
        let back: WorkflowTriggers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, triggers);
    }
}
