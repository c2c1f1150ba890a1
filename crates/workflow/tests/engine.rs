//! End-to-end workflow engine tests over in-memory ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{Datelike, Duration, Utc};
use procura_core::chain::CreatorProfile;
use procura_core::progress::TaskCounts;
use procura_core::project::{Project, ProjectItem};
use procura_core::tasks::MilestoneTask;
use procura_core::types::{
    ApprovalLevel, BudgetThreshold, DbId, DepartmentKind, DepartmentRef, ProjectScope,
    ProjectStatus, WorkflowPhase,
};
use procura_core::WorkflowError;
use procura_events::EventBus;
use procura_workflow::ports::{
    AuditSink, Directory, InventoryService, NotificationRequest, Notifier, OrderSnapshot,
    ProcurementService, ProjectStore, TaskService,
};
use procura_workflow::{CreateProjectInput, WorkflowService};
use serde_json::json;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeStore {
    projects: Mutex<HashMap<DbId, Project>>,
    next_id: AtomicI64,
    seqs: Mutex<HashMap<(String, i32), i64>>,
}

#[async_trait]
impl ProjectStore for FakeStore {
    async fn insert(&self, project: &Project) -> Result<Project, WorkflowError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut stored = project.clone();
        stored.id = id;
        stored.version = 1;
        self.projects
            .lock()
            .unwrap()
            .insert(id, stored.clone());
        Ok(stored)
    }

    async fn load(&self, id: DbId) -> Result<Project, WorkflowError> {
        self.projects
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found("project", id))
    }

    async fn save(&self, project: &Project) -> Result<(), WorkflowError> {
        let mut projects = self.projects.lock().unwrap();
        let stored = projects
            .get_mut(&project.id)
            .ok_or_else(|| WorkflowError::not_found("project", project.id))?;
        if stored.version != project.version {
            return Err(WorkflowError::Conflict(format!(
                "project {} version {} is stale",
                project.id, project.version
            )));
        }
        let mut updated = project.clone();
        updated.version += 1;
        *stored = updated;
        Ok(())
    }

    async fn next_code_seq(&self, prefix: &str, year: i32) -> Result<i64, WorkflowError> {
        let mut seqs = self.seqs.lock().unwrap();
        let seq = seqs.entry((prefix.to_string(), year)).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}

struct FakeDirectory {
    departments: Vec<DepartmentRef>,
    users: HashMap<DbId, CreatorProfile>,
}

impl FakeDirectory {
    fn standard() -> Self {
        let dept = |id, name: &str, kind, hod| DepartmentRef {
            id,
            name: name.to_string(),
            kind,
            hod_user_id: Some(hod),
        };
        let mut users = HashMap::new();
        users.insert(
            100,
            CreatorProfile {
                user_id: 100,
                role_level: 300,
                department_id: 1,
            },
        );
        users.insert(
            999,
            CreatorProfile {
                user_id: 999,
                role_level: 1000,
                department_id: 5,
            },
        );
        FakeDirectory {
            departments: vec![
                dept(1, "Engineering", DepartmentKind::General, 10),
                dept(2, "Project Management", DepartmentKind::ProjectManagement, 20),
                dept(3, "Legal & Compliance", DepartmentKind::LegalCompliance, 30),
                dept(4, "Finance", DepartmentKind::Finance, 40),
                dept(5, "Executive Office", DepartmentKind::Executive, 50),
                dept(6, "Operations", DepartmentKind::Operations, 60),
                dept(7, "Procurement", DepartmentKind::Procurement, 70),
            ],
            users,
        }
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn department(&self, id: DbId) -> Result<DepartmentRef, WorkflowError> {
        self.departments
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found("department", id))
    }

    async fn department_of_kind(
        &self,
        kind: DepartmentKind,
    ) -> Result<DepartmentRef, WorkflowError> {
        self.departments
            .iter()
            .find(|d| d.kind == kind)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found("department", kind))
    }

    async fn creator_profile(&self, user_id: DbId) -> Result<CreatorProfile, WorkflowError> {
        self.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found("user", user_id))
    }
}

#[derive(Default)]
struct FakeTasks {
    created: Mutex<Vec<(DbId, MilestoneTask)>>,
    counts: Mutex<HashMap<DbId, TaskCounts>>,
}

#[async_trait]
impl TaskService for FakeTasks {
    async fn create_milestones(
        &self,
        project_id: DbId,
        _created_by: DbId,
        milestones: Vec<MilestoneTask>,
    ) -> Result<(), WorkflowError> {
        let mut created = self.created.lock().unwrap();
        for m in milestones {
            created.push((project_id, m));
        }
        Ok(())
    }

    async fn counts(&self, project_id: DbId) -> Result<TaskCounts, WorkflowError> {
        Ok(self
            .counts
            .lock()
            .unwrap()
            .get(&project_id)
            .copied()
            .unwrap_or(TaskCounts {
                total: 0,
                completed: 0,
            }))
    }
}

#[derive(Default)]
struct FakeNotifier {
    sent: Mutex<Vec<NotificationRequest>>,
    fail: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, request: NotificationRequest) -> Result<(), WorkflowError> {
        if self.fail {
            return Err(WorkflowError::Internal("notification channel down".into()));
        }
        self.sent.lock().unwrap().push(request);
        Ok(())
    }
}

#[derive(Default)]
struct FakeAudit {
    entries: Mutex<Vec<(DbId, String)>>,
}

#[async_trait]
impl AuditSink for FakeAudit {
    async fn record(
        &self,
        _entity_type: &str,
        entity_id: DbId,
        action: &str,
        _actor_user_id: Option<DbId>,
        _detail: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        self.entries
            .lock()
            .unwrap()
            .push((entity_id, action.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct FakeInventory {
    created: Mutex<Vec<String>>,
    next: AtomicI64,
}

impl FakeInventory {
    fn code(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("INV-2026-{n:04}")
    }
}

#[async_trait]
impl InventoryService for FakeInventory {
    async fn create_aggregate(
        &self,
        _project: &Project,
        _actor: DbId,
    ) -> Result<String, WorkflowError> {
        let code = self.code();
        self.created.lock().unwrap().push(code.clone());
        Ok(code)
    }

    async fn create_from_lines(
        &self,
        _project_id: DbId,
        lines: &[ProjectItem],
        _actor: DbId,
    ) -> Result<Vec<String>, WorkflowError> {
        let mut codes = Vec::new();
        let mut created = self.created.lock().unwrap();
        for _ in lines {
            let code = self.code();
            created.push(code.clone());
            codes.push(code);
        }
        Ok(codes)
    }
}

#[derive(Default)]
struct FakeProcurement {
    orders: Mutex<HashMap<DbId, OrderSnapshot>>,
    delivered: Mutex<Vec<DbId>>,
    next: AtomicI64,
}

#[async_trait]
impl ProcurementService for FakeProcurement {
    async fn create_order(
        &self,
        project: &Project,
        line_items: Vec<ProjectItem>,
        total: i64,
        _actor: DbId,
    ) -> Result<String, WorkflowError> {
        let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let code = format!("PO-2026-{id:04}");
        self.orders.lock().unwrap().insert(
            id,
            OrderSnapshot {
                id,
                code: code.clone(),
                project_id: project.id,
                line_items,
                total,
            },
        );
        Ok(code)
    }

    async fn load_order(&self, order_id: DbId) -> Result<OrderSnapshot, WorkflowError> {
        self.orders
            .lock()
            .unwrap()
            .get(&order_id)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found("procurement order", order_id))
    }

    async fn mark_delivered(&self, order_id: DbId) -> Result<(), WorkflowError> {
        self.delivered.lock().unwrap().push(order_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    service: WorkflowService,
    store: Arc<FakeStore>,
    tasks: Arc<FakeTasks>,
    notifier: Arc<FakeNotifier>,
    inventory: Arc<FakeInventory>,
    procurement: Arc<FakeProcurement>,
    bus: Arc<EventBus>,
}

fn harness() -> Harness {
    harness_with_notifier(FakeNotifier::default())
}

fn harness_with_notifier(notifier: FakeNotifier) -> Harness {
    let store = Arc::new(FakeStore::default());
    let tasks = Arc::new(FakeTasks::default());
    let notifier = Arc::new(notifier);
    let inventory = Arc::new(FakeInventory::default());
    let procurement = Arc::new(FakeProcurement::default());
    let bus = Arc::new(EventBus::default());
    let service = WorkflowService::new(
        store.clone(),
        Arc::new(FakeDirectory::standard()),
        tasks.clone(),
        notifier.clone(),
        Arc::new(FakeAudit::default()),
        inventory.clone(),
        procurement.clone(),
        bus.clone(),
    );
    Harness {
        service,
        store,
        tasks,
        notifier,
        inventory,
        procurement,
        bus,
    }
}

fn input(scope: ProjectScope, budget: i64, requires_budget_allocation: bool) -> CreateProjectInput {
    let start = Utc::now();
    CreateProjectInput {
        name: "Workstation refresh".to_string(),
        description: None,
        scope,
        department_id: 1,
        created_by: 100,
        budget,
        requires_budget_allocation,
        requires_compliance: false,
        required_documents: Vec::new(),
        items: Vec::new(),
        start_date: start,
        end_date: start + Duration::days(100),
    }
}

async fn approve(h: &Harness, id: DbId, approver: DbId, level: ApprovalLevel) -> Project {
    h.service
        .approve_project(id, approver, level, None)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creating_personal_project_generates_code_and_chain() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();

    let year = Utc::now().year();
    assert_eq!(p.code, format!("ENG-{year}-0001"));
    assert_eq!(p.budget_threshold, BudgetThreshold::HodAutoApprove);
    let levels: Vec<ApprovalLevel> = p.approval_chain.iter().map(|s| s.level).collect();
    assert_eq!(
        levels,
        vec![ApprovalLevel::DepartmentHod, ApprovalLevel::ProjectManagement]
    );
    assert_eq!(p.status, ProjectStatus::PendingDepartmentHodApproval);

    // The first approver's department was notified.
    let sent = h.notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].notification_type, "approval_required");
}

#[tokio::test]
async fn top_tier_creator_bypasses_the_chain() {
    let h = harness();
    let mut req = input(ProjectScope::Personal, 800_000, false);
    req.created_by = 999;
    req.department_id = 5;
    let p = h.service.create_project(req).await.unwrap();
    assert!(p.approval_chain.is_empty());
    assert_eq!(p.status, ProjectStatus::Approved);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let h = harness();
    let mut req = input(ProjectScope::Personal, -1, false);
    let err = h.service.create_project(req.clone()).await.unwrap_err();
    assert_matches!(err, WorkflowError::Validation(_));

    req.budget = 800_000;
    req.end_date = req.start_date - Duration::days(1);
    let err = h.service.create_project(req).await.unwrap_err();
    assert_matches!(err, WorkflowError::Validation(_));
}

#[tokio::test]
async fn chain_preview_matches_scope_rules() {
    let h = harness();
    // External, executive tier, no allocation: finance is skipped.
    let steps = h
        .service
        .generate_approval_chain(ProjectScope::External, 30_000_000, false, 100, 1)
        .await
        .unwrap();
    let levels: Vec<ApprovalLevel> = steps.iter().map(|s| s.level).collect();
    assert_eq!(
        levels,
        vec![
            ApprovalLevel::ProjectManagement,
            ApprovalLevel::LegalCompliance,
            ApprovalLevel::Executive,
        ]
    );
}

// ---------------------------------------------------------------------------
// Chain execution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_approval_flow_reaches_approved_and_publishes() {
    let h = harness();
    let mut rx = h.bus.subscribe();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();

    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    let p = approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    assert_eq!(p.status, ProjectStatus::Approved);

    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.event_name);
    }
    assert!(names.contains(&"project.created".to_string()));
    assert!(names.contains(&"project.step_approved".to_string()));
    assert!(names.contains(&"project.chain_completed".to_string()));

    // The creator learns the chain completed.
    let sent = h.notifier.sent.lock().unwrap();
    assert!(sent.iter().any(|n| n.notification_type == "project_approved"));
}

#[tokio::test]
async fn rejection_and_resubmission_round_trip() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();

    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    let p = h
        .service
        .reject_project(p.id, 20, ApprovalLevel::ProjectManagement, Some("scope creep".into()))
        .await
        .unwrap();
    assert_eq!(p.status, ProjectStatus::RevisionRequired);

    let p = h.service.resubmit_project(p.id, 100).await.unwrap();
    assert_eq!(p.status, ProjectStatus::PendingProjectManagementApproval);
    // The HOD approval survived the rewind.
    assert_eq!(
        p.approval_chain[0].status,
        procura_core::types::StepStatus::Approved
    );

    let sent = h.notifier.sent.lock().unwrap();
    assert!(sent.iter().any(|n| n.notification_type == "project_rejected"));
}

#[tokio::test]
async fn stale_version_save_is_a_conflict() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    let stale = p.clone();
    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;

    let err = h.store.save(&stale).await.unwrap_err();
    assert_matches!(err, WorkflowError::Conflict(_));
}

// ---------------------------------------------------------------------------
// Phase movement & dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn implementation_requires_an_approved_project() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    let err = h
        .service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::Precondition(_));
}

#[tokio::test]
async fn backward_phase_movement_is_invalid() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    h.service
        .progress_workflow(p.id, WorkflowPhase::Approval, "phase_progressed", 100, json!({}))
        .await
        .unwrap();
    let err = h
        .service
        .progress_workflow(p.id, WorkflowPhase::Planning, "phase_progressed", 100, json!({}))
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::InvalidTransition { .. });
}

#[tokio::test]
async fn personal_project_without_allocation_gets_milestones() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;

    let p = h
        .service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();
    assert_eq!(p.status, ProjectStatus::Implementation);
    assert!(p.workflow_triggers.tasks_synthesized.is_some());

    let created = h.tasks.created.lock().unwrap();
    assert_eq!(created.len(), 3);
    // 20/60/20 over a 100-day window.
    let (_, setup) = &created[0];
    let (_, execution) = &created[1];
    let (_, review) = &created[2];
    assert_eq!((setup.due_at - setup.starts_at).num_days(), 20);
    assert_eq!((execution.due_at - execution.starts_at).num_days(), 60);
    assert_eq!((review.due_at - review.starts_at).num_days(), 20);
    assert_eq!(setup.due_at, execution.starts_at);
    assert_eq!(execution.due_at, review.starts_at);
}

#[tokio::test]
async fn dispatch_fires_only_once() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;

    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();
    // Same-phase transition is allowed but must not re-dispatch.
    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();
    assert_eq!(h.tasks.created.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn external_project_synthesizes_procurement_with_aggregate_fallback() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::External, 800_000, false))
        .await
        .unwrap();
    // Low-tier external chain is just project management.
    let p = approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    assert_eq!(p.status, ProjectStatus::Approved);

    let p = h
        .service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();
    assert!(p.workflow_triggers.procurement.is_started());

    let orders = h.procurement.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    let order = orders.values().next().unwrap();
    assert_eq!(order.line_items.len(), 1);
    assert_eq!(order.line_items[0].unit_cost, 800_000);
    assert_eq!(order.total, 800_000);
}

#[tokio::test]
async fn external_line_items_are_taken_verbatim() {
    let h = harness();
    let mut req = input(ProjectScope::External, 800_000, false);
    req.items = vec![
        ProjectItem {
            name: "Laptop".into(),
            description: None,
            quantity: 3,
            unit_cost: 250_000,
            category: "it_equipment".into(),
        },
        ProjectItem {
            name: "Desk".into(),
            description: None,
            quantity: 1,
            unit_cost: 50_000,
            category: "furniture".into(),
        },
    ];
    let p = h.service.create_project(req).await.unwrap();
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();

    let orders = h.procurement.orders.lock().unwrap();
    let order = orders.values().next().unwrap();
    assert_eq!(order.line_items.len(), 2);
    assert_eq!(order.total, 800_000);
}

#[tokio::test]
async fn delivered_order_expands_into_inventory() {
    let h = harness();
    let mut req = input(ProjectScope::External, 800_000, false);
    req.items = vec![ProjectItem {
        name: "Laptop".into(),
        description: None,
        quantity: 3,
        unit_cost: 250_000,
        category: "it_equipment".into(),
    }];
    let p = h.service.create_project(req).await.unwrap();
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();

    let order_id = *h.procurement.orders.lock().unwrap().keys().next().unwrap();
    let p = h
        .service
        .create_inventory_from_procurement(order_id, 70)
        .await
        .unwrap();
    assert!(p.workflow_triggers.inventory.is_started());
    assert_eq!(h.inventory.created.lock().unwrap().len(), 1);
    assert_eq!(h.procurement.delivered.lock().unwrap().len(), 1);

    let sent = h.notifier.sent.lock().unwrap();
    assert!(sent.iter().any(|n| n.notification_type == "inventory_setup_required"));
    assert!(sent.iter().any(|n| n.notification_type == "delivery_acknowledged"));
}

#[tokio::test]
async fn repeated_delivery_does_not_expand_inventory_twice() {
    let h = harness();
    let mut req = input(ProjectScope::External, 800_000, false);
    req.items = vec![ProjectItem {
        name: "Laptop".into(),
        description: None,
        quantity: 3,
        unit_cost: 250_000,
        category: "it_equipment".into(),
    }];
    let p = h.service.create_project(req).await.unwrap();
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();

    let order_id = *h.procurement.orders.lock().unwrap().keys().next().unwrap();
    h.service
        .create_inventory_from_procurement(order_id, 70)
        .await
        .unwrap();
    let p = h
        .service
        .create_inventory_from_procurement(order_id, 70)
        .await
        .unwrap();

    // The second callback is a no-op: no extra inventory records, no
    // second delivery mark.
    assert!(p.workflow_triggers.inventory.is_started());
    assert_eq!(h.inventory.created.lock().unwrap().len(), 1);
    assert_eq!(h.procurement.delivered.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn allocation_resume_notifies_operations_of_pending_inventory() {
    let h = harness();
    // Top-tier creator: empty chain, approved at creation, no allocation
    // stamp yet.
    let mut req = input(ProjectScope::External, 800_000, true);
    req.created_by = 999;
    let p = h.service.create_project(req).await.unwrap();
    assert_eq!(p.status, ProjectStatus::Approved);

    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 999, json!({}))
        .await
        .unwrap();

    // Dispatch halted on the missing allocation: nothing synthesized,
    // Operations not pinged yet.
    assert!(h.procurement.orders.lock().unwrap().is_empty());
    assert!(!h
        .notifier
        .sent
        .lock()
        .unwrap()
        .iter()
        .any(|n| n.notification_type == "inventory_pending"));

    let p = h.service.approve_budget_allocation(p.id, 40).await.unwrap();
    assert!(p.workflow_triggers.procurement.is_started());
    assert_eq!(h.procurement.orders.lock().unwrap().len(), 1);
    assert!(h
        .notifier
        .sent
        .lock()
        .unwrap()
        .iter()
        .any(|n| n.notification_type == "inventory_pending"));
}

// ---------------------------------------------------------------------------
// Budget allocation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn personal_allocation_project_runs_both_sub_workflows() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, true))
        .await
        .unwrap();
    // Allocation forces the full chain.
    let levels: Vec<ApprovalLevel> = p.approval_chain.iter().map(|s| s.level).collect();
    assert_eq!(
        levels,
        vec![
            ApprovalLevel::DepartmentHod,
            ApprovalLevel::ProjectManagement,
            ApprovalLevel::LegalCompliance,
            ApprovalLevel::Finance,
            ApprovalLevel::BudgetAllocation,
        ]
    );

    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    approve(&h, p.id, 30, ApprovalLevel::LegalCompliance).await;
    let p = approve(&h, p.id, 40, ApprovalLevel::Finance).await;
    assert_eq!(p.status, ProjectStatus::PendingBudgetAllocation);

    let p = h.service.approve_budget_allocation(p.id, 40).await.unwrap();
    assert_eq!(p.status, ProjectStatus::Approved);
    assert!(p.workflow_triggers.budget_allocation_approved.is_some());

    let p = h
        .service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();
    assert!(p.workflow_triggers.inventory.is_started());
    assert!(p.workflow_triggers.procurement.is_started());
    // Not yet implementing until both sub-workflows complete.
    assert_eq!(p.status, ProjectStatus::Approved);

    h.service.complete_inventory(p.id, 60).await.unwrap();
    let p = h.service.complete_procurement(p.id, 70).await.unwrap();
    assert_eq!(p.status, ProjectStatus::Implementation);
}

#[tokio::test]
async fn allocation_on_project_not_requiring_it_is_a_precondition_error() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    let err = h.service.approve_budget_allocation(p.id, 40).await.unwrap_err();
    assert_matches!(err, WorkflowError::Precondition(_));
}

// ---------------------------------------------------------------------------
// Compliance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn compliance_completion_is_gated_on_both_sub_workflows() {
    let h = harness();
    let mut req = input(ProjectScope::Personal, 800_000, true);
    req.requires_compliance = true;
    let p = h.service.create_project(req).await.unwrap();

    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    approve(&h, p.id, 30, ApprovalLevel::LegalCompliance).await;
    approve(&h, p.id, 40, ApprovalLevel::Finance).await;
    h.service.approve_budget_allocation(p.id, 40).await.unwrap();
    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();

    h.service.trigger_regulatory_compliance(p.id, 30).await.unwrap();
    let err = h
        .service
        .complete_regulatory_compliance(p.id, 30)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::Precondition(_));

    h.service.complete_inventory(p.id, 60).await.unwrap();
    h.service.complete_procurement(p.id, 70).await.unwrap();

    // Legal was told the review is unblocked.
    {
        let sent = h.notifier.sent.lock().unwrap();
        assert!(sent.iter().any(|n| n.notification_type == "compliance_unblocked"));
    }

    let p = h
        .service
        .complete_regulatory_compliance(p.id, 30)
        .await
        .unwrap();
    assert!(p.workflow_triggers.compliance.is_completed());
}

#[tokio::test]
async fn compliance_trigger_is_idempotent() {
    let h = harness();
    let mut req = input(ProjectScope::Personal, 800_000, false);
    req.requires_compliance = true;
    let p = h.service.create_project(req).await.unwrap();

    h.service.trigger_regulatory_compliance(p.id, 30).await.unwrap();
    let before = h.notifier.sent.lock().unwrap().len();
    h.service.trigger_regulatory_compliance(p.id, 30).await.unwrap();
    assert_eq!(h.notifier.sent.lock().unwrap().len(), before);
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn two_phase_progress_uses_task_counts() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    approve(&h, p.id, 20, ApprovalLevel::ProjectManagement).await;
    h.service
        .progress_workflow(p.id, WorkflowPhase::Implementation, "phase_progressed", 100, json!({}))
        .await
        .unwrap();

    h.tasks.counts.lock().unwrap().insert(
        p.id,
        TaskCounts {
            total: 4,
            completed: 2,
        },
    );
    let p = h.service.update_two_phase_progress(p.id).await.unwrap();
    // Chain fully approved, no documents: approval phase holds at 80.
    assert_eq!(p.approval_progress, 80.0);
    assert_eq!(p.implementation_progress, 50.0);
    assert_eq!(p.progress, 80.0);
}

// ---------------------------------------------------------------------------
// Resilience
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notification_failures_never_fail_transitions() {
    let h = harness_with_notifier(FakeNotifier {
        sent: Mutex::new(Vec::new()),
        fail: true,
    });
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();
    let p = approve(&h, p.id, 10, ApprovalLevel::DepartmentHod).await;
    assert_eq!(p.status, ProjectStatus::PendingProjectManagementApproval);
}

// ---------------------------------------------------------------------------
// Team membership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn team_membership_is_soft_and_reactivating() {
    let h = harness();
    let p = h
        .service
        .create_project(input(ProjectScope::Personal, 800_000, false))
        .await
        .unwrap();

    let p = h
        .service
        .add_team_member(p.id, 200, "engineer".into(), 100)
        .await
        .unwrap();
    assert_eq!(p.team_members.len(), 1);
    assert!(p.team_members[0].is_active);

    let p = h.service.remove_team_member(p.id, 200, 100).await.unwrap();
    assert_eq!(p.team_members.len(), 1);
    assert!(!p.team_members[0].is_active);

    // Removing again is an error, not a silent no-op.
    let err = h.service.remove_team_member(p.id, 200, 100).await.unwrap_err();
    assert_matches!(err, WorkflowError::NotFound { .. });

    // Re-adding reactivates the same record with the new role.
    let p = h
        .service
        .add_team_member(p.id, 200, "lead".into(), 100)
        .await
        .unwrap();
    assert_eq!(p.team_members.len(), 1);
    assert!(p.team_members[0].is_active);
    assert_eq!(p.team_members[0].role, "lead");
}
