//! The workflow service: project lifecycle orchestration.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use procura_core::chain::{generate_chain, ApprovalStep, ChainContext, ChainDepartments};
use procura_core::events::DomainEvent;
use procura_core::project::{actions, Project, ProjectItem, RequiredDocument};
use procura_core::types::{
    ApprovalLevel, DbId, DepartmentKind, ProjectScope, ProjectStatus, Timestamp, WorkflowPhase,
};
use procura_core::{naming, threshold, WorkflowError};
use procura_events::{EventBus, WorkflowEvent};
use serde::Deserialize;
use serde_json::json;

use crate::ports::{
    AuditSink, Directory, InventoryService, NotificationRequest, Notifier, ProcurementService,
    ProjectStore, Recipient, TaskService,
};

/// Everything needed to open a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub scope: ProjectScope,
    pub department_id: DbId,
    pub created_by: DbId,
    pub budget: i64,
    pub requires_budget_allocation: bool,
    #[serde(default)]
    pub requires_compliance: bool,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub items: Vec<ProjectItem>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

/// Orchestrates every workflow transition against the collaborator ports.
///
/// Cheap to clone; all fields are shared handles.
#[derive(Clone)]
pub struct WorkflowService {
    pub(crate) store: Arc<dyn ProjectStore>,
    pub(crate) directory: Arc<dyn Directory>,
    pub(crate) tasks: Arc<dyn TaskService>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) audit: Arc<dyn AuditSink>,
    pub(crate) inventory: Arc<dyn InventoryService>,
    pub(crate) procurement: Arc<dyn ProcurementService>,
    pub(crate) bus: Arc<EventBus>,
}

impl WorkflowService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn ProjectStore>,
        directory: Arc<dyn Directory>,
        tasks: Arc<dyn TaskService>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditSink>,
        inventory: Arc<dyn InventoryService>,
        procurement: Arc<dyn ProcurementService>,
        bus: Arc<EventBus>,
    ) -> Self {
        WorkflowService {
            store,
            directory,
            tasks,
            notifier,
            audit,
            inventory,
            procurement,
            bus,
        }
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Open a project: classify the budget, generate the code and the
    /// approval chain, and persist.
    ///
    /// A top-tier creator gets an empty chain and the project lands
    /// directly in `approved`.
    pub async fn create_project(&self, input: CreateProjectInput) -> Result<Project, WorkflowError> {
        if input.name.trim().is_empty() {
            return Err(WorkflowError::Validation("project name is required".into()));
        }
        if input.budget < 0 {
            return Err(WorkflowError::Validation("budget cannot be negative".into()));
        }
        if input.end_date < input.start_date {
            return Err(WorkflowError::Validation(
                "end date cannot precede start date".into(),
            ));
        }

        let now = Utc::now();
        let department = self.directory.department(input.department_id).await?;
        let creator = self.directory.creator_profile(input.created_by).await?;
        let classified = threshold::classify(input.budget, department.kind);

        let prefix = naming::department_prefix(&department.name);
        let year = now.year();
        let seq = self.store.next_code_seq(&prefix, year).await?;
        let code = naming::project_code(&prefix, year, seq as u32);

        let departments = self.chain_departments(department.clone()).await?;
        let chain = generate_chain(&ChainContext {
            scope: input.scope,
            threshold: classified,
            requires_budget_allocation: input.requires_budget_allocation,
            creator: &creator,
            departments: &departments,
        });

        let mut project = Project::new(
            0,
            code,
            input.name,
            input.scope,
            input.department_id,
            input.created_by,
            input.budget,
            classified,
            input.requires_budget_allocation,
            input.requires_compliance,
            input.start_date,
            input.end_date,
            now,
        );
        project.description = input.description;
        project.required_documents = input
            .required_documents
            .into_iter()
            .map(RequiredDocument::new)
            .collect();
        project.items = input.items;
        project.approval_chain = chain;

        project.status = match project.current_step() {
            Some(step) => step.level.pending_status(),
            None => ProjectStatus::Approved,
        };
        project.recalculate_progress(None);

        let project = self.store.insert(&project).await?;

        self.try_audit(
            project.id,
            "project_created",
            Some(project.created_by),
            json!({ "code": project.code, "status": project.status }),
        )
        .await;
        self.bus.publish(
            WorkflowEvent::new("project.created")
                .with_project(project.id)
                .with_actor(project.created_by)
                .with_payload(json!({ "code": project.code })),
        );

        if let Some(step) = project.current_step() {
            self.try_notify(
                NotificationRequest::new(
                    Recipient::DepartmentHod(step.department_id),
                    "approval_required",
                    "Project approval required",
                    format!(
                        "Project {} ({}) awaits your {} approval",
                        project.code, project.name, step.level
                    ),
                )
                .data(json!({ "project_id": project.id, "level": step.level })),
            )
            .await;
        }

        Ok(project)
    }

    /// Build the chain a hypothetical project would get, without
    /// persisting anything.
    pub async fn generate_approval_chain(
        &self,
        scope: ProjectScope,
        budget: i64,
        requires_budget_allocation: bool,
        created_by: DbId,
        department_id: DbId,
    ) -> Result<Vec<ApprovalStep>, WorkflowError> {
        let department = self.directory.department(department_id).await?;
        let creator = self.directory.creator_profile(created_by).await?;
        let classified = threshold::classify(budget, department.kind);
        let departments = self.chain_departments(department).await?;
        Ok(generate_chain(&ChainContext {
            scope,
            threshold: classified,
            requires_budget_allocation,
            creator: &creator,
            departments: &departments,
        }))
    }

    async fn chain_departments(
        &self,
        creator_department: procura_core::types::DepartmentRef,
    ) -> Result<ChainDepartments, WorkflowError> {
        Ok(ChainDepartments {
            creator: creator_department,
            project_management: self
                .directory
                .department_of_kind(DepartmentKind::ProjectManagement)
                .await?,
            legal_compliance: self
                .directory
                .department_of_kind(DepartmentKind::LegalCompliance)
                .await?,
            finance: self.directory.department_of_kind(DepartmentKind::Finance).await?,
            executive: self.directory.department_of_kind(DepartmentKind::Executive).await?,
        })
    }

    // -----------------------------------------------------------------------
    // Chain execution
    // -----------------------------------------------------------------------

    /// Approve the current step at `level` on behalf of `approver`.
    pub async fn approve_project(
        &self,
        project_id: DbId,
        approver: DbId,
        level: ApprovalLevel,
        comments: Option<String>,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        let events = project.approve_step(approver, level, comments, Utc::now())?;
        self.store.save(&project).await?;
        project.version += 1;

        self.try_audit(
            project.id,
            actions::STEP_APPROVED,
            Some(approver),
            json!({ "level": level, "status": project.status }),
        )
        .await;
        self.dispatch_events(&project, Some(approver), &events).await;
        Ok(project)
    }

    /// Reject the current step at `level`. The project parks in
    /// `revision_required` until resubmitted.
    pub async fn reject_project(
        &self,
        project_id: DbId,
        rejecter: DbId,
        level: ApprovalLevel,
        comments: Option<String>,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        let events = project.reject_step(rejecter, level, comments, Utc::now())?;
        self.store.save(&project).await?;
        project.version += 1;

        self.try_audit(
            project.id,
            actions::STEP_REJECTED,
            Some(rejecter),
            json!({ "level": level }),
        )
        .await;
        self.dispatch_events(&project, Some(rejecter), &events).await;
        Ok(project)
    }

    /// Resubmit a revision-required project, rewinding the rejected step
    /// and everything after it.
    pub async fn resubmit_project(
        &self,
        project_id: DbId,
        resubmitted_by: DbId,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        let events = project.resubmit(resubmitted_by, Utc::now())?;
        self.store.save(&project).await?;
        project.version += 1;

        self.try_audit(
            project.id,
            actions::RESUBMITTED,
            Some(resubmitted_by),
            json!({ "status": project.status }),
        )
        .await;
        self.dispatch_events(&project, Some(resubmitted_by), &events).await;

        if let Some(step) = project.current_step() {
            self.try_notify(
                NotificationRequest::new(
                    Recipient::DepartmentHod(step.department_id),
                    "approval_required",
                    "Resubmitted project awaits approval",
                    format!(
                        "Project {} was resubmitted and awaits your {} approval",
                        project.code, step.level
                    ),
                )
                .data(json!({ "project_id": project.id, "level": step.level })),
            )
            .await;
        }
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Team membership
    // -----------------------------------------------------------------------

    /// Add a user to the project team, or reactivate a removed membership
    /// with the new role.
    pub async fn add_team_member(
        &self,
        project_id: DbId,
        user_id: DbId,
        role: String,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        project.add_team_member(user_id, role.clone());
        project.updated_at = Utc::now();
        self.store.save(&project).await?;
        project.version += 1;

        self.try_audit(
            project.id,
            actions::TEAM_MEMBER_ADDED,
            Some(actor),
            json!({ "user_id": user_id, "role": role }),
        )
        .await;
        Ok(project)
    }

    /// Soft-remove a team member; the membership record stays on the
    /// aggregate as inactive.
    pub async fn remove_team_member(
        &self,
        project_id: DbId,
        user_id: DbId,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        if !project.remove_team_member(user_id) {
            return Err(WorkflowError::not_found("team member", user_id));
        }
        project.updated_at = Utc::now();
        self.store.save(&project).await?;
        project.version += 1;

        self.try_audit(
            project.id,
            actions::TEAM_MEMBER_REMOVED,
            Some(actor),
            json!({ "user_id": user_id }),
        )
        .await;
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Phase movement
    // -----------------------------------------------------------------------

    /// Advance the workflow phase. Entering `implementation` fires the
    /// post-approval trigger dispatcher exactly once, and requires the
    /// project to be fully approved.
    pub async fn progress_workflow(
        &self,
        project_id: DbId,
        new_phase: WorkflowPhase,
        action: &str,
        triggered_by: DbId,
        metadata: serde_json::Value,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;

        let entering_implementation = new_phase == WorkflowPhase::Implementation
            && project.workflow_phase.ordinal() < WorkflowPhase::Implementation.ordinal();
        if entering_implementation && project.status != ProjectStatus::Approved {
            return Err(WorkflowError::Precondition(format!(
                "project must be approved before implementation, status is '{}'",
                project.status
            )));
        }

        let mut events = project.progress_phase(new_phase, action, triggered_by, metadata, Utc::now())?;
        if entering_implementation {
            let dispatched = self.run_post_approval_dispatch(&mut project, triggered_by).await?;
            events.extend(dispatched);
        }
        self.store.save(&project).await?;
        project.version += 1;

        self.dispatch_events(&project, Some(triggered_by), &events).await;
        Ok(project)
    }

    /// Re-run the post-approval dispatch for an already-implementing
    /// project, loading it fresh. Exposed for the allocation-resume path.
    pub async fn trigger_post_approval_workflow(
        &self,
        project_id: DbId,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        if project.status != ProjectStatus::Approved {
            return Err(WorkflowError::Precondition(format!(
                "post-approval workflow requires an approved project, status is '{}'",
                project.status
            )));
        }
        let events = self.run_post_approval_dispatch(&mut project, actor).await?;
        self.store.save(&project).await?;
        project.version += 1;
        self.dispatch_events(&project, Some(actor), &events).await;
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Budget allocation
    // -----------------------------------------------------------------------

    /// Record the budget allocation decision and resume any halted
    /// dispatch.
    pub async fn approve_budget_allocation(
        &self,
        project_id: DbId,
        approver: DbId,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        if !project.requires_budget_allocation {
            return Err(WorkflowError::Precondition(
                "project does not require budget allocation".into(),
            ));
        }

        let now = Utc::now();
        let mut events = Vec::new();
        let has_pending_allocation_step = project
            .approval_chain
            .iter()
            .any(|s| s.is_pending() && s.level == ApprovalLevel::BudgetAllocation);

        if has_pending_allocation_step {
            events.extend(project.approve_step(
                approver,
                ApprovalLevel::BudgetAllocation,
                None,
                now,
            )?);
        } else {
            if project.workflow_triggers.budget_allocation_approved.is_some() {
                return Err(WorkflowError::InvalidState(
                    "budget allocation is already approved".into(),
                ));
            }
            project.workflow_triggers.budget_allocation_approved =
                Some(procura_core::triggers::TriggerStamp { by: approver, at: now });
            if project.status == ProjectStatus::PendingBudgetAllocation {
                project.status = ProjectStatus::Approved;
            }
            project.record_budget_allocation(approver, now);
        }

        // Resume a dispatch that halted waiting on allocation.
        if project.workflow_phase.ordinal() >= WorkflowPhase::Implementation.ordinal() {
            match project.scope {
                ProjectScope::External => {
                    if self.trigger_procurement_creation(&mut project, approver).await? {
                        self.notify_inventory_pending(&project).await;
                    }
                }
                ProjectScope::Personal => {
                    self.trigger_inventory_creation(&mut project, approver).await?;
                    self.trigger_procurement_creation(&mut project, approver).await?;
                }
                ProjectScope::Departmental => {}
            }
        }

        self.store.save(&project).await?;
        project.version += 1;

        self.try_audit(
            project.id,
            actions::BUDGET_ALLOCATED,
            Some(approver),
            json!({ "status": project.status }),
        )
        .await;
        self.dispatch_events(&project, Some(approver), &events).await;
        self.bus.publish(
            WorkflowEvent::new("project.budget_allocated")
                .with_project(project.id)
                .with_actor(approver),
        );
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Recompute approval/implementation/overall progress from current
    /// task counts and persist the numbers.
    pub async fn update_two_phase_progress(&self, project_id: DbId) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        let counts = self.tasks.counts(project_id).await?;
        project.recalculate_progress(Some(counts));
        project.updated_at = Utc::now();
        self.store.save(&project).await?;
        project.version += 1;
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Event/notification plumbing
    // -----------------------------------------------------------------------

    /// Publish aggregate events to the bus and fan out the notifications
    /// they imply. Notification failures are logged and swallowed.
    pub(crate) async fn dispatch_events(
        &self,
        project: &Project,
        actor: Option<DbId>,
        events: &[DomainEvent],
    ) {
        for event in events {
            let mut envelope = WorkflowEvent::from_domain(event, project.id);
            if let Some(actor) = actor {
                envelope = envelope.with_actor(actor);
            }
            self.bus.publish(envelope);

            match event {
                DomainEvent::ApprovalAdvanced {
                    next_level,
                    next_department_id,
                } => {
                    self.try_notify(
                        NotificationRequest::new(
                            Recipient::DepartmentHod(*next_department_id),
                            "approval_required",
                            "Project approval required",
                            format!(
                                "Project {} awaits your {} approval",
                                project.code, next_level
                            ),
                        )
                        .data(json!({ "project_id": project.id, "level": next_level })),
                    )
                    .await;
                }
                DomainEvent::ChainCompleted => {
                    self.try_notify(
                        NotificationRequest::new(
                            Recipient::User(project.created_by),
                            "project_approved",
                            "Project approved",
                            format!("Project {} has completed its approval chain", project.code),
                        )
                        .priority("high")
                        .data(json!({ "project_id": project.id })),
                    )
                    .await;
                }
                DomainEvent::StepRejected { comments, .. } => {
                    self.try_notify(
                        NotificationRequest::new(
                            Recipient::User(project.created_by),
                            "project_rejected",
                            "Project requires revision",
                            format!(
                                "Project {} was rejected{}",
                                project.code,
                                comments
                                    .as_deref()
                                    .map(|c| format!(": {c}"))
                                    .unwrap_or_default()
                            ),
                        )
                        .priority("high")
                        .data(json!({ "project_id": project.id })),
                    )
                    .await;
                }
                DomainEvent::BudgetAllocationPending { total } => {
                    self.try_notify(
                        NotificationRequest::new(
                            Recipient::FunctionHod(DepartmentKind::Finance),
                            "budget_allocation_pending",
                            "Budget allocation required",
                            format!(
                                "Project {} awaits budget allocation ({total})",
                                project.code
                            ),
                        )
                        .priority("high")
                        .data(json!({ "project_id": project.id, "total": total })),
                    )
                    .await;
                }
                DomainEvent::BudgetReviewRequested => {
                    self.try_notify(
                        NotificationRequest::new(
                            Recipient::FunctionHod(DepartmentKind::Finance),
                            "budget_review_requested",
                            "Budget review requested",
                            format!(
                                "Legal approval on project {} requests a budget review",
                                project.code
                            ),
                        )
                        .data(json!({ "project_id": project.id })),
                    )
                    .await;
                }
                DomainEvent::StepApproved { .. }
                | DomainEvent::PhaseAdvanced { .. }
                | DomainEvent::Resubmitted { .. } => {}
            }
        }
    }

    pub(crate) async fn try_notify(&self, request: NotificationRequest) {
        if let Err(e) = self.notifier.notify(request).await {
            tracing::warn!(error = %e, "Failed to send notification");
        }
    }

    pub(crate) async fn try_audit(
        &self,
        project_id: DbId,
        action: &str,
        actor: Option<DbId>,
        detail: serde_json::Value,
    ) {
        if let Err(e) = self
            .audit
            .record("project", project_id, action, actor, detail)
            .await
        {
            tracing::warn!(error = %e, action, "Failed to record audit entry");
        }
    }
}
