//! HTTP surface for the Procura workflow engine.
//!
//! Thin axum handlers over [`procura_workflow::WorkflowService`] and the
//! repository layer. All responses use the `{ "data": ... }` envelope
//! from [`response`]; domain errors map to HTTP statuses in [`error`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
