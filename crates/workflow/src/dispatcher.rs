//! Post-approval trigger dispatch.
//!
//! When a fully-approved project enters implementation, exactly one
//! dispatch run branches on the project scope and fires the downstream
//! sub-workflows. Each sub-trigger is guarded by its trigger state
//! machine, so re-dispatch is a no-op. Side-effect failures in
//! notifications and audit are logged at warn and swallowed; failures in
//! the synthesis collaborators themselves propagate.

use chrono::Utc;
use procura_core::events::DomainEvent;
use procura_core::project::{actions, Project, ProjectItem};
use procura_core::tasks::milestone_tasks;
use procura_core::triggers::TriggerStamp;
use procura_core::types::{DbId, DepartmentKind, ProjectScope, ProjectStatus};
use procura_core::WorkflowError;
use procura_events::WorkflowEvent;
use serde_json::json;

use crate::ports::{NotificationRequest, Recipient};
use crate::service::WorkflowService;

impl WorkflowService {
    /// The scope branch, run once on implementation entry.
    ///
    /// Mutates the aggregate in place; the caller persists it. Returns
    /// the domain events to dispatch after the save.
    pub(crate) async fn run_post_approval_dispatch(
        &self,
        project: &mut Project,
        actor: DbId,
    ) -> Result<Vec<DomainEvent>, WorkflowError> {
        let now = Utc::now();
        let mut events = Vec::new();

        match (project.scope, project.requires_budget_allocation) {
            (ProjectScope::External, requires_allocation) => {
                let allocation_satisfied = !requires_allocation
                    || project.workflow_triggers.budget_allocation_approved.is_some();
                if allocation_satisfied {
                    if self.trigger_procurement_creation(project, actor).await? {
                        self.notify_inventory_pending(project).await;
                    }
                } else {
                    // Halt until the allocation lands; the resume path in
                    // approve_budget_allocation picks this up.
                    tracing::info!(
                        project_id = project.id,
                        "External project awaiting budget allocation, dispatch halted"
                    );
                }
            }
            (ProjectScope::Departmental, _) => {
                // Departmental spend is reimbursed, not procured: no
                // inventory or procurement synthesis.
                project.record_trigger(
                    actions::TRIGGER_FIRED,
                    actor,
                    json!({ "dispatcher": "departmental_reimbursement" }),
                    now,
                );
            }
            (ProjectScope::Personal, true) => {
                if project.workflow_triggers.budget_allocation_approved.is_some() {
                    // Allocation already granted (chain step): synthesize
                    // both sub-workflows; the completion callbacks move
                    // the project into implementation.
                    self.trigger_inventory_creation(project, actor).await?;
                    self.trigger_procurement_creation(project, actor).await?;
                } else {
                    project.status = ProjectStatus::PendingBudgetAllocation;
                    events.push(DomainEvent::BudgetAllocationPending {
                        total: project.itemized_total(),
                    });
                    project.record_trigger(
                        actions::TRIGGER_FIRED,
                        actor,
                        json!({ "dispatcher": "awaiting_budget_allocation" }),
                        now,
                    );
                }
            }
            (ProjectScope::Personal, false) => {
                let milestones =
                    milestone_tasks(&project.name, project.start_date, project.end_date);
                self.tasks
                    .create_milestones(project.id, project.created_by, milestones)
                    .await?;
                project.workflow_triggers.tasks_synthesized =
                    Some(TriggerStamp { by: actor, at: now });
                project.status = ProjectStatus::Implementation;
                project.record_trigger(
                    actions::TRIGGER_FIRED,
                    actor,
                    json!({ "dispatcher": "milestone_tasks" }),
                    now,
                );
                project.recalculate_progress(None);
            }
        }

        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Sub-triggers
    // -----------------------------------------------------------------------

    /// Tell Operations that procurement is underway and inventory will
    /// arrive with delivery. Sent whenever procurement synthesis fires,
    /// on the primary dispatch and on the allocation-resume path alike.
    pub(crate) async fn notify_inventory_pending(&self, project: &Project) {
        self.try_notify(
            NotificationRequest::new(
                Recipient::FunctionHod(DepartmentKind::Operations),
                "inventory_pending",
                "Inventory pending delivery",
                format!(
                    "Project {} procurement is underway; inventory will follow delivery",
                    project.code
                ),
            )
            .data(json!({ "project_id": project.id })),
        )
        .await;
    }

    /// Synthesize the single aggregate inventory record. Returns `false`
    /// when the trigger had already fired.
    pub async fn trigger_inventory_creation(
        &self,
        project: &mut Project,
        actor: DbId,
    ) -> Result<bool, WorkflowError> {
        let now = Utc::now();
        if !project
            .workflow_triggers
            .inventory
            .start(TriggerStamp { by: actor, at: now })
        {
            return Ok(false);
        }

        let code = self.inventory.create_aggregate(project, actor).await?;
        project.record_trigger(
            actions::TRIGGER_FIRED,
            actor,
            json!({ "trigger": "inventory", "code": code }),
            now,
        );

        self.try_notify(
            NotificationRequest::new(
                Recipient::FunctionHod(DepartmentKind::Operations),
                "inventory_created",
                "Inventory record created",
                format!("Inventory {code} was created for project {}", project.code),
            )
            .data(json!({ "project_id": project.id, "code": code })),
        )
        .await;
        self.bus.publish(
            WorkflowEvent::new("project.inventory_triggered")
                .with_project(project.id)
                .with_actor(actor)
                .with_payload(json!({ "code": code })),
        );
        Ok(true)
    }

    /// Synthesize one purchase order with line items taken verbatim from
    /// the project's itemized requirements. Returns `false` when the
    /// trigger had already fired.
    pub async fn trigger_procurement_creation(
        &self,
        project: &mut Project,
        actor: DbId,
    ) -> Result<bool, WorkflowError> {
        let now = Utc::now();
        if !project
            .workflow_triggers
            .procurement
            .start(TriggerStamp { by: actor, at: now })
        {
            return Ok(false);
        }

        let line_items = if project.items.is_empty() {
            // Aggregate fallback when the project was not itemized.
            vec![ProjectItem {
                name: project.name.clone(),
                description: Some("Aggregate project requirement".to_string()),
                quantity: 1,
                unit_cost: project.budget,
                category: "general".to_string(),
            }]
        } else {
            project.items.clone()
        };
        let total = project.itemized_total();
        let code = self
            .procurement
            .create_order(project, line_items, total, actor)
            .await?;
        project.record_trigger(
            actions::TRIGGER_FIRED,
            actor,
            json!({ "trigger": "procurement", "code": code }),
            now,
        );

        self.try_notify(
            NotificationRequest::new(
                Recipient::FunctionHod(DepartmentKind::Procurement),
                "procurement_created",
                "Purchase order created",
                format!("Purchase order {code} was created for project {}", project.code),
            )
            .data(json!({ "project_id": project.id, "code": code, "total": total })),
        )
        .await;
        self.bus.publish(
            WorkflowEvent::new("project.procurement_triggered")
                .with_project(project.id)
                .with_actor(actor)
                .with_payload(json!({ "code": code })),
        );
        Ok(true)
    }

    /// Expand a delivered purchase order's lines into individual
    /// inventory records.
    pub async fn create_inventory_from_procurement(
        &self,
        order_id: DbId,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        let now = Utc::now();
        let order = self.procurement.load_order(order_id).await?;
        let mut project = self.store.load(order.project_id).await?;

        // Delivery expansion is what starts the inventory machine for
        // procurement-driven projects; a repeated delivery callback must
        // not expand the line items again.
        if !project
            .workflow_triggers
            .inventory
            .start(TriggerStamp { by: actor, at: now })
        {
            tracing::debug!(
                project_id = project.id,
                order_id,
                "Inventory already expanded for this project, skipping"
            );
            return Ok(project);
        }

        self.procurement.mark_delivered(order_id).await?;
        let codes = self
            .inventory
            .create_from_lines(project.id, &order.line_items, actor)
            .await?;
        project.record_trigger(
            actions::TRIGGER_FIRED,
            actor,
            json!({
                "trigger": "inventory_from_procurement",
                "order": order.code,
                "items": codes.len(),
            }),
            now,
        );
        self.store.save(&project).await?;
        project.version += 1;

        self.try_notify(
            NotificationRequest::new(
                Recipient::FunctionHod(DepartmentKind::Operations),
                "inventory_setup_required",
                "Delivered items need setup",
                format!(
                    "{} inventory records from order {} need setup for project {}",
                    codes.len(),
                    order.code,
                    project.code
                ),
            )
            .data(json!({ "project_id": project.id, "order_id": order.id })),
        )
        .await;
        self.try_notify(
            NotificationRequest::new(
                Recipient::FunctionHod(DepartmentKind::Procurement),
                "delivery_acknowledged",
                "Delivery acknowledged",
                format!("Order {} was expanded into inventory", order.code),
            )
            .data(json!({ "order_id": order.id })),
        )
        .await;
        self.bus.publish(
            WorkflowEvent::new("project.inventory_expanded")
                .with_project(project.id)
                .with_actor(actor)
                .with_payload(json!({ "order": order.code, "items": codes.len() })),
        );
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Compliance
    // -----------------------------------------------------------------------

    /// Open the regulatory compliance sub-workflow. Idempotent.
    pub async fn trigger_regulatory_compliance(
        &self,
        project_id: DbId,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        if !project.requires_compliance {
            return Err(WorkflowError::Precondition(
                "project does not require regulatory compliance".into(),
            ));
        }
        let now = Utc::now();
        if !project
            .workflow_triggers
            .compliance
            .start(TriggerStamp { by: actor, at: now })
        {
            return Ok(project);
        }
        project.record_trigger(
            actions::TRIGGER_FIRED,
            actor,
            json!({ "trigger": "compliance" }),
            now,
        );
        self.store.save(&project).await?;
        project.version += 1;

        self.try_notify(
            NotificationRequest::new(
                Recipient::FunctionHod(DepartmentKind::LegalCompliance),
                "compliance_review_required",
                "Compliance review required",
                format!("Project {} requires regulatory compliance review", project.code),
            )
            .data(json!({ "project_id": project.id })),
        )
        .await;
        self.bus.publish(
            WorkflowEvent::new("project.compliance_triggered")
                .with_project(project.id)
                .with_actor(actor),
        );
        Ok(project)
    }

    /// Close the compliance sub-workflow. Gated on both the inventory and
    /// procurement machines having completed.
    pub async fn complete_regulatory_compliance(
        &self,
        project_id: DbId,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        if !project.workflow_triggers.compliance_ready() {
            return Err(WorkflowError::Precondition(
                "inventory and procurement must be completed before compliance sign-off".into(),
            ));
        }
        let now = Utc::now();
        let changed = project
            .workflow_triggers
            .compliance
            .complete(TriggerStamp { by: actor, at: now }, "compliance")?;
        if !changed {
            return Ok(project);
        }
        project.record_trigger(
            actions::TRIGGER_COMPLETED,
            actor,
            json!({ "trigger": "compliance" }),
            now,
        );
        project.recalculate_progress(None);
        self.store.save(&project).await?;
        project.version += 1;

        self.bus.publish(
            WorkflowEvent::new("project.compliance_completed")
                .with_project(project.id)
                .with_actor(actor),
        );
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Completion callbacks
    // -----------------------------------------------------------------------

    /// Operations callback: the inventory sub-workflow is done.
    pub async fn complete_inventory(
        &self,
        project_id: DbId,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        self.complete_sub_workflow(project_id, actor, SubWorkflow::Inventory).await
    }

    /// Procurement callback: the procurement sub-workflow is done.
    pub async fn complete_procurement(
        &self,
        project_id: DbId,
        actor: DbId,
    ) -> Result<Project, WorkflowError> {
        self.complete_sub_workflow(project_id, actor, SubWorkflow::Procurement).await
    }

    async fn complete_sub_workflow(
        &self,
        project_id: DbId,
        actor: DbId,
        which: SubWorkflow,
    ) -> Result<Project, WorkflowError> {
        let mut project = self.store.load(project_id).await?;
        let now = Utc::now();
        let stamp = TriggerStamp { by: actor, at: now };
        let changed = match which {
            SubWorkflow::Inventory => {
                project.workflow_triggers.inventory.complete(stamp, "inventory")?
            }
            SubWorkflow::Procurement => {
                project.workflow_triggers.procurement.complete(stamp, "procurement")?
            }
        };

        // Personal allocation projects reach implementation once both
        // synthesis tasks exist.
        if project.scope == ProjectScope::Personal
            && project.requires_budget_allocation
            && project.workflow_triggers.inventory.is_started()
            && project.workflow_triggers.procurement.is_started()
            && !project.status.counts_implementation_progress()
        {
            project.status = ProjectStatus::Implementation;
        }

        let counts = self.tasks.counts(project_id).await?;
        project.recalculate_progress(Some(counts));

        if changed {
            project.record_trigger(
                actions::TRIGGER_COMPLETED,
                actor,
                json!({ "trigger": which.name() }),
                now,
            );
        }
        self.store.save(&project).await?;
        project.version += 1;

        if changed {
            self.bus.publish(
                WorkflowEvent::new(which.completed_event())
                    .with_project(project.id)
                    .with_actor(actor),
            );
            self.notify_compliance_if_unblocked(&project).await;
        }
        Ok(project)
    }

    /// Tell Legal their review is unblocked once both upstream machines
    /// complete.
    async fn notify_compliance_if_unblocked(&self, project: &Project) {
        if project.requires_compliance
            && project.workflow_triggers.compliance.is_started()
            && !project.workflow_triggers.compliance.is_completed()
            && project.workflow_triggers.compliance_ready()
        {
            self.try_notify(
                NotificationRequest::new(
                    Recipient::FunctionHod(DepartmentKind::LegalCompliance),
                    "compliance_unblocked",
                    "Compliance review unblocked",
                    format!(
                        "Inventory and procurement completed for project {}; review can proceed",
                        project.code
                    ),
                )
                .data(json!({ "project_id": project.id })),
            )
            .await;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SubWorkflow {
    Inventory,
    Procurement,
}

impl SubWorkflow {
    fn name(&self) -> &'static str {
        match self {
            SubWorkflow::Inventory => "inventory",
            SubWorkflow::Procurement => "procurement",
        }
    }

    fn completed_event(&self) -> &'static str {
        match self {
            SubWorkflow::Inventory => "project.inventory_completed",
            SubWorkflow::Procurement => "project.procurement_completed",
        }
    }
}
