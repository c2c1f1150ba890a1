//! Collaborator ports.
//!
//! The orchestration layer depends on these traits rather than on
//! concrete repositories. Production wiring lives in [`crate::pg`];
//! tests substitute in-memory fakes.

use async_trait::async_trait;
use procura_core::chain::CreatorProfile;
use procura_core::progress::TaskCounts;
use procura_core::project::{Project, ProjectItem};
use procura_core::tasks::MilestoneTask;
use procura_core::types::{DbId, DepartmentKind, DepartmentRef};
use procura_core::WorkflowError;

/// Persistence for the project aggregate.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a fresh aggregate, returning it with its assigned id.
    async fn insert(&self, project: &Project) -> Result<Project, WorkflowError>;

    async fn load(&self, id: DbId) -> Result<Project, WorkflowError>;

    /// Persist mutations guarded by `project.version`; a concurrent
    /// write surfaces as [`WorkflowError::Conflict`].
    async fn save(&self, project: &Project) -> Result<(), WorkflowError>;

    /// Reserve the next year-scoped sequence number for a code prefix.
    async fn next_code_seq(&self, prefix: &str, year: i32) -> Result<i64, WorkflowError>;
}

/// Department and user lookups needed for chain generation.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn department(&self, id: DbId) -> Result<DepartmentRef, WorkflowError>;

    /// The department fulfilling a functional role (project management,
    /// legal, finance, executive).
    async fn department_of_kind(&self, kind: DepartmentKind)
        -> Result<DepartmentRef, WorkflowError>;

    async fn creator_profile(&self, user_id: DbId) -> Result<CreatorProfile, WorkflowError>;
}

/// Implementation task collaborator.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn create_milestones(
        &self,
        project_id: DbId,
        created_by: DbId,
        milestones: Vec<MilestoneTask>,
    ) -> Result<(), WorkflowError>;

    async fn counts(&self, project_id: DbId) -> Result<TaskCounts, WorkflowError>;
}

/// Who a notification goes to.
#[derive(Debug, Clone)]
pub enum Recipient {
    User(DbId),
    /// The HOD of a concrete department.
    DepartmentHod(DbId),
    /// The HOD of whichever department fulfils a functional role
    /// (operations, procurement, finance, legal).
    FunctionHod(DepartmentKind),
}

/// A notification fan-out request.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub recipient: Recipient,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub data: serde_json::Value,
}

impl NotificationRequest {
    pub fn new(
        recipient: Recipient,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        NotificationRequest {
            recipient,
            notification_type: notification_type.into(),
            title: title.into(),
            message: message.into(),
            priority: "medium".to_string(),
            data: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Notification delivery. Failures are never fatal to workflow
/// transitions; callers log and continue.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: NotificationRequest) -> Result<(), WorkflowError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(
        &self,
        entity_type: &str,
        entity_id: DbId,
        action: &str,
        actor_user_id: Option<DbId>,
        detail: serde_json::Value,
    ) -> Result<(), WorkflowError>;
}

/// Inventory synthesis collaborator.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Create the single aggregate record sized to the project budget.
    /// Returns the generated inventory code.
    async fn create_aggregate(&self, project: &Project, actor: DbId)
        -> Result<String, WorkflowError>;

    /// Expand delivered procurement lines into individual records.
    /// Returns the generated codes, one per line.
    async fn create_from_lines(
        &self,
        project_id: DbId,
        lines: &[ProjectItem],
        actor: DbId,
    ) -> Result<Vec<String>, WorkflowError>;
}

/// Snapshot of a purchase order for delivery expansion.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    pub id: DbId,
    pub code: String,
    pub project_id: DbId,
    pub line_items: Vec<ProjectItem>,
    pub total: i64,
}

/// Procurement synthesis collaborator.
#[async_trait]
pub trait ProcurementService: Send + Sync {
    /// Create one purchase order. Returns the generated PO code.
    async fn create_order(
        &self,
        project: &Project,
        line_items: Vec<ProjectItem>,
        total: i64,
        actor: DbId,
    ) -> Result<String, WorkflowError>;

    async fn load_order(&self, order_id: DbId) -> Result<OrderSnapshot, WorkflowError>;

    async fn mark_delivered(&self, order_id: DbId) -> Result<(), WorkflowError>;
}
