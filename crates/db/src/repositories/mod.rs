//! Repository layer. One unit struct per table with static async
//! functions over a [`sqlx::PgPool`].

pub mod approval_request_repo;
pub mod audit_repo;
pub mod department_repo;
pub mod event_repo;
pub mod inventory_repo;
pub mod notification_repo;
pub mod procurement_repo;
pub mod project_repo;
pub mod task_repo;
pub mod team_member_repo;
pub mod user_repo;
pub mod workflow_template_repo;

pub use approval_request_repo::ApprovalRequestRepo;
pub use audit_repo::AuditRepo;
pub use department_repo::DepartmentRepo;
pub use event_repo::EventRepo;
pub use inventory_repo::InventoryRepo;
pub use notification_repo::NotificationRepo;
pub use procurement_repo::ProcurementRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use team_member_repo::TeamMemberRepo;
pub use user_repo::UserRepo;
pub use workflow_template_repo::WorkflowTemplateRepo;
