//! Postgres-backed port implementations.
//!
//! Thin adapters from the port traits to the repository layer. All
//! domain decisions stay in the service and core; these translate calls
//! and map `sqlx` errors into [`WorkflowError`].

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use procura_core::category;
use procura_core::chain::CreatorProfile;
use procura_core::naming;
use procura_core::progress::TaskCounts;
use procura_core::project::{Project, ProjectItem};
use procura_core::tasks::MilestoneTask;
use procura_core::types::{DbId, DepartmentKind, DepartmentRef};
use procura_core::WorkflowError;
use procura_db::models::inventory::CreateInventoryItem;
use procura_db::models::notification::CreateNotification;
use procura_db::models::procurement::{CreateProcurementOrder, ORDER_DELIVERED};
use procura_db::models::task::CreateTask;
use procura_db::repositories::{
    AuditRepo, DepartmentRepo, InventoryRepo, NotificationRepo, ProcurementRepo, ProjectRepo,
    TaskRepo, UserRepo,
};
use procura_db::DbPool;

use crate::ports::{
    AuditSink, Directory, InventoryService, NotificationRequest, Notifier, OrderSnapshot,
    ProcurementService, ProjectStore, Recipient, TaskService,
};

fn db_err(e: sqlx::Error) -> WorkflowError {
    WorkflowError::Internal(e.to_string())
}

// ---------------------------------------------------------------------------
// Project store
// ---------------------------------------------------------------------------

pub struct PgProjectStore {
    pool: DbPool,
}

impl PgProjectStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn insert(&self, project: &Project) -> Result<Project, WorkflowError> {
        let row = ProjectRepo::insert(&self.pool, project).await.map_err(db_err)?;
        row.into_domain()
    }

    async fn load(&self, id: DbId) -> Result<Project, WorkflowError> {
        let row = ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("project", id))?;
        row.into_domain()
    }

    async fn save(&self, project: &Project) -> Result<(), WorkflowError> {
        let saved = ProjectRepo::save(&self.pool, project).await.map_err(db_err)?;
        if !saved {
            return Err(WorkflowError::Conflict(format!(
                "project {} was modified concurrently (version {})",
                project.id, project.version
            )));
        }
        Ok(())
    }

    async fn next_code_seq(&self, prefix: &str, year: i32) -> Result<i64, WorkflowError> {
        ProjectRepo::next_code_seq(&self.pool, prefix, year)
            .await
            .map_err(db_err)
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

pub struct PgDirectory {
    pool: DbPool,
}

impl PgDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn department(&self, id: DbId) -> Result<DepartmentRef, WorkflowError> {
        DepartmentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("department", id))?
            .into_ref()
    }

    async fn department_of_kind(
        &self,
        kind: DepartmentKind,
    ) -> Result<DepartmentRef, WorkflowError> {
        DepartmentRepo::find_by_kind(&self.pool, kind.as_str())
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("department", kind))?
            .into_ref()
    }

    async fn creator_profile(&self, user_id: DbId) -> Result<CreatorProfile, WorkflowError> {
        let user = UserRepo::find_by_id(&self.pool, user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("user", user_id))?;
        Ok(CreatorProfile {
            user_id: user.id,
            role_level: user.role_level,
            department_id: user.department_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub struct PgTaskService {
    pool: DbPool,
}

impl PgTaskService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskService for PgTaskService {
    async fn create_milestones(
        &self,
        project_id: DbId,
        created_by: DbId,
        milestones: Vec<MilestoneTask>,
    ) -> Result<(), WorkflowError> {
        let inputs: Vec<CreateTask> = milestones
            .into_iter()
            .map(|m| CreateTask {
                project_id,
                title: m.title,
                description: Some(m.description),
                starts_at: m.starts_at,
                due_at: m.due_at,
                created_by,
            })
            .collect();
        TaskRepo::create_many(&self.pool, &inputs).await.map_err(db_err)?;
        Ok(())
    }

    async fn counts(&self, project_id: DbId) -> Result<TaskCounts, WorkflowError> {
        let row = TaskRepo::counts_for_project(&self.pool, project_id)
            .await
            .map_err(db_err)?;
        Ok(TaskCounts {
            total: row.total as u32,
            completed: row.completed as u32,
        })
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

pub struct PgNotifier {
    pool: DbPool,
}

impl PgNotifier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn resolve_recipient(&self, recipient: &Recipient) -> Result<Option<DbId>, WorkflowError> {
        match recipient {
            Recipient::User(id) => Ok(Some(*id)),
            Recipient::DepartmentHod(department_id) => {
                let department = DepartmentRepo::find_by_id(&self.pool, *department_id)
                    .await
                    .map_err(db_err)?
                    .ok_or_else(|| WorkflowError::not_found("department", department_id))?;
                Ok(department.hod_user_id)
            }
            Recipient::FunctionHod(kind) => {
                let department = DepartmentRepo::find_by_kind(&self.pool, kind.as_str())
                    .await
                    .map_err(db_err)?
                    .ok_or_else(|| WorkflowError::not_found("department", kind))?;
                Ok(department.hod_user_id)
            }
        }
    }
}

#[async_trait]
impl Notifier for PgNotifier {
    async fn notify(&self, request: NotificationRequest) -> Result<(), WorkflowError> {
        let Some(recipient_user_id) = self.resolve_recipient(&request.recipient).await? else {
            // A department without a HOD has nobody to notify.
            tracing::warn!(
                recipient = ?request.recipient,
                notification_type = %request.notification_type,
                "No resolvable recipient for notification, skipping"
            );
            return Ok(());
        };
        NotificationRepo::create(
            &self.pool,
            &CreateNotification {
                recipient_user_id,
                notification_type: request.notification_type,
                title: request.title,
                message: request.message,
                priority: request.priority,
                data: request.data,
            },
        )
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

pub struct PgAuditSink {
    pool: DbPool,
}

impl PgAuditSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(
        &self,
        entity_type: &str,
        entity_id: DbId,
        action: &str,
        actor_user_id: Option<DbId>,
        detail: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        AuditRepo::append(
            &self.pool,
            &procura_db::models::audit::CreateAuditEntry {
                entity_type: entity_type.to_string(),
                entity_id,
                action: action.to_string(),
                actor_user_id,
                detail,
            },
        )
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

pub struct PgInventoryService {
    pool: DbPool,
}

impl PgInventoryService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn next_code(&self) -> Result<String, WorkflowError> {
        let year = Utc::now().year();
        let seq = ProjectRepo::next_code_seq(&self.pool, "INV", year)
            .await
            .map_err(db_err)?;
        Ok(naming::inventory_code(year, seq as u32))
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn create_aggregate(
        &self,
        project: &Project,
        actor: DbId,
    ) -> Result<String, WorkflowError> {
        let code = self.next_code().await?;
        let unified = category::unify(
            project
                .items
                .first()
                .map(|i| i.category.as_str())
                .unwrap_or("general"),
        );
        InventoryRepo::create(
            &self.pool,
            &code,
            &CreateInventoryItem {
                name: format!("{} resources", project.name),
                category: unified.to_string(),
                quantity: 1,
                unit_cost: project.budget,
                project_id: Some(project.id),
                created_by: actor,
            },
        )
        .await
        .map_err(db_err)?;
        Ok(code)
    }

    async fn create_from_lines(
        &self,
        project_id: DbId,
        lines: &[ProjectItem],
        actor: DbId,
    ) -> Result<Vec<String>, WorkflowError> {
        let mut codes = Vec::with_capacity(lines.len());
        for line in lines {
            let code = self.next_code().await?;
            InventoryRepo::create(
                &self.pool,
                &code,
                &CreateInventoryItem {
                    name: line.name.clone(),
                    category: category::unify(&line.category).to_string(),
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                    project_id: Some(project_id),
                    created_by: actor,
                },
            )
            .await
            .map_err(db_err)?;
            codes.push(code);
        }
        Ok(codes)
    }
}

// ---------------------------------------------------------------------------
// Procurement
// ---------------------------------------------------------------------------

pub struct PgProcurementService {
    pool: DbPool,
}

impl PgProcurementService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcurementService for PgProcurementService {
    async fn create_order(
        &self,
        project: &Project,
        line_items: Vec<ProjectItem>,
        total: i64,
        actor: DbId,
    ) -> Result<String, WorkflowError> {
        let year = Utc::now().year();
        let seq = ProjectRepo::next_code_seq(&self.pool, "PO", year)
            .await
            .map_err(db_err)?;
        let code = naming::procurement_code(year, seq as u32);
        ProcurementRepo::create(
            &self.pool,
            &code,
            &CreateProcurementOrder {
                project_id: project.id,
                line_items,
                total,
                created_by: actor,
            },
        )
        .await
        .map_err(db_err)?;
        Ok(code)
    }

    async fn load_order(&self, order_id: DbId) -> Result<OrderSnapshot, WorkflowError> {
        let order = ProcurementRepo::find_by_id(&self.pool, order_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("procurement order", order_id))?;
        Ok(OrderSnapshot {
            id: order.id,
            code: order.code,
            project_id: order.project_id,
            line_items: order.line_items.0,
            total: order.total,
        })
    }

    async fn mark_delivered(&self, order_id: DbId) -> Result<(), WorkflowError> {
        ProcurementRepo::set_status(&self.pool, order_id, ORDER_DELIVERED)
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("procurement order", order_id))?;
        Ok(())
    }
}
