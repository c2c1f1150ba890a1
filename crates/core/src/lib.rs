//! Pure domain logic for the Procura procurement platform.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the workflow engine, the API, and any future worker
//! or CLI tooling. Everything here is synchronous and side-effect free:
//! state transitions mutate the [`project::Project`] aggregate in memory
//! and return [`events::DomainEvent`]s describing the side effects the
//! orchestration layer must perform.

pub mod approval_request;
pub mod category;
pub mod chain;
pub mod error;
pub mod events;
pub mod naming;
pub mod phase;
pub mod progress;
pub mod project;
pub mod tasks;
pub mod template;
pub mod threshold;
pub mod triggers;
pub mod types;

pub use error::WorkflowError;
