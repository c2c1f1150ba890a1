//! Workflow phase state machine.
//!
//! Phases are totally ordered (planning < approval < implementation <
//! execution < completion) and movement is monotonic. The transition
//! itself lives on [`crate::project::Project::progress_phase`]; this
//! module holds the pure ordering check.

use crate::error::WorkflowError;
use crate::types::WorkflowPhase;

/// Validate a phase transition.
///
/// Backward movement is forbidden; staying in the same phase is allowed
/// (re-entrant transitions record a fresh history entry).
pub fn validate_transition(
    current: WorkflowPhase,
    attempted: WorkflowPhase,
) -> Result<(), WorkflowError> {
    if attempted.ordinal() < current.ordinal() {
        Err(WorkflowError::InvalidTransition { current, attempted })
    } else {
        Ok(())
    }
}
