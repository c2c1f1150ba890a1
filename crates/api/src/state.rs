use std::sync::Arc;

use procura_events::EventBus;
use procura_workflow::pg::{
    PgAuditSink, PgDirectory, PgInventoryService, PgNotifier, PgProcurementService, PgProjectStore,
    PgTaskService,
};
use procura_workflow::WorkflowService;

use crate::config::ServerConfig;

/// Shared application state available to all axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: procura_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The workflow engine, wired to its Postgres adapters.
    pub service: WorkflowService,
    /// Centralized event bus for publishing workflow events.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Wire the workflow service to its Postgres port implementations.
    pub fn new(pool: procura_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let service = WorkflowService::new(
            Arc::new(PgProjectStore::new(pool.clone())),
            Arc::new(PgDirectory::new(pool.clone())),
            Arc::new(PgTaskService::new(pool.clone())),
            Arc::new(PgNotifier::new(pool.clone())),
            Arc::new(PgAuditSink::new(pool.clone())),
            Arc::new(PgInventoryService::new(pool.clone())),
            Arc::new(PgProcurementService::new(pool.clone())),
            Arc::clone(&event_bus),
        );
        AppState {
            pool,
            config: Arc::new(config),
            service,
            event_bus,
        }
    }
}
