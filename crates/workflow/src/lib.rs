//! Workflow orchestration.
//!
//! [`WorkflowService`] drives the project lifecycle: creation (code,
//! threshold, chain generation), chain execution, phase movement, the
//! post-approval trigger dispatcher, and two-phase progress updates. It
//! talks to persistence and collaborators exclusively through the port
//! traits in [`ports`], so the whole engine is testable without a
//! database.

pub mod dispatcher;
pub mod pg;
pub mod ports;
pub mod service;

pub use service::{CreateProjectInput, WorkflowService};
