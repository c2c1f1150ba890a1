//! Implementation milestone task synthesis.
//!
//! Personal projects that need no budget allocation get three standard
//! milestone tasks when they enter implementation, time-sliced 20/60/20
//! across the project's start/end window.

use serde::Serialize;

use crate::types::Timestamp;

/// Fraction of the window given to the setup milestone.
pub const SETUP_FRACTION: f64 = 0.2;

/// Fraction of the window given to the execution milestone.
pub const EXECUTION_FRACTION: f64 = 0.6;

/// A synthesized milestone task, handed to the task collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneTask {
    pub title: String,
    pub description: String,
    pub starts_at: Timestamp,
    pub due_at: Timestamp,
}

/// Synthesize the standard setup/execution/review milestones.
///
/// When the window is empty or inverted all three milestones collapse to
/// the start date.
pub fn milestone_tasks(project_name: &str, start: Timestamp, end: Timestamp) -> Vec<MilestoneTask> {
    let window = (end - start).num_seconds().max(0);
    let at = |fraction: f64| start + chrono::Duration::seconds((window as f64 * fraction) as i64);

    let setup_end = at(SETUP_FRACTION);
    let execution_end = at(SETUP_FRACTION + EXECUTION_FRACTION);

    vec![
        MilestoneTask {
            title: format!("{project_name}: setup"),
            description: "Prepare resources, accesses, and kickoff for the project.".to_string(),
            starts_at: start,
            due_at: setup_end,
        },
        MilestoneTask {
            title: format!("{project_name}: execution"),
            description: "Carry out the main body of project work.".to_string(),
            starts_at: setup_end,
            due_at: execution_end,
        },
        MilestoneTask {
            title: format!("{project_name}: review"),
            description: "Verify deliverables and close out the project.".to_string(),
            starts_at: execution_end,
            due_at: end.max(start),
        },
    ]
}
