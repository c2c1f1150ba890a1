//! Domain error taxonomy.
//!
//! Chain-generation and approval-execution errors propagate to the caller;
//! side-effect failures inside the dispatcher (notifications, audit) are
//! logged and swallowed by the orchestration layer instead of surfacing
//! through these variants.

use crate::types::WorkflowPhase;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Referenced project/step/department/user does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation attempted against a step or status that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Backward phase movement attempted.
    #[error("invalid phase transition: current phase is '{current}', attempted '{attempted}'")]
    InvalidTransition {
        current: WorkflowPhase,
        attempted: WorkflowPhase,
    },

    /// Dispatcher invoked before its precondition holds.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Optimistic version check failed on save.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected failure in a collaborator the operation depends on.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// Shorthand for a [`WorkflowError::NotFound`] with a numeric id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        WorkflowError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_both_phases() {
        let err = WorkflowError::InvalidTransition {
            current: WorkflowPhase::Execution,
            attempted: WorkflowPhase::Approval,
        };
        let msg = err.to_string();
        assert!(msg.contains("execution"));
        assert!(msg.contains("approval"));
    }

    #[test]
    fn not_found_includes_entity_and_id() {
        let err = WorkflowError::not_found("Project", 42);
        assert_eq!(err.to_string(), "Project not found: 42");
    }
}
