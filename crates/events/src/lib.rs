//! Event bus infrastructure.
//!
//! - [`EventBus`] is the in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`WorkflowEvent`] is the canonical event envelope.
//! - [`EventPersistence`] is the background service that durably writes
//!   every published event to the `events` table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, WorkflowEvent};
pub use persistence::EventPersistence;
