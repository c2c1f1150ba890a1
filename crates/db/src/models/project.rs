//! Project row model and domain mapping.

use procura_core::chain::ApprovalStep;
use procura_core::project::{Project, ProjectItem, RequiredDocument, TeamMember, WorkflowHistoryEntry};
use procura_core::triggers::WorkflowTriggers;
use procura_core::types::{DbId, Timestamp};
use procura_core::WorkflowError;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `projects` table.
///
/// Scalar workflow fields are text columns (the snake_case enum strings);
/// aggregate-valued fields are JSONB. [`ProjectRow::into_domain`] parses
/// into the typed aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub scope: String,
    pub department_id: DbId,
    pub created_by: DbId,
    pub budget: i64,
    pub actual_cost: i64,
    pub budget_threshold: String,
    pub requires_budget_allocation: bool,
    pub requires_compliance: bool,
    pub status: String,
    pub workflow_phase: String,
    pub workflow_step: i32,
    pub workflow_history: Json<Vec<WorkflowHistoryEntry>>,
    pub approval_chain: Json<Vec<ApprovalStep>>,
    pub workflow_triggers: Json<WorkflowTriggers>,
    pub approval_progress: f64,
    pub implementation_progress: f64,
    pub progress: f64,
    pub required_documents: Json<Vec<RequiredDocument>>,
    pub items: Json<Vec<ProjectItem>>,
    pub team_members: Json<Vec<TeamMember>>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectRow {
    /// Parse the row into the domain aggregate.
    pub fn into_domain(self) -> Result<Project, WorkflowError> {
        Ok(Project {
            id: self.id,
            code: self.code,
            name: self.name,
            description: self.description,
            scope: self.scope.parse()?,
            department_id: self.department_id,
            created_by: self.created_by,
            budget: self.budget,
            actual_cost: self.actual_cost,
            budget_threshold: self.budget_threshold.parse()?,
            requires_budget_allocation: self.requires_budget_allocation,
            requires_compliance: self.requires_compliance,
            status: self.status.parse()?,
            workflow_phase: self.workflow_phase.parse()?,
            workflow_step: self.workflow_step as u32,
            workflow_history: self.workflow_history.0,
            approval_chain: self.approval_chain.0,
            workflow_triggers: self.workflow_triggers.0,
            approval_progress: self.approval_progress,
            implementation_progress: self.implementation_progress,
            progress: self.progress,
            required_documents: self.required_documents.0,
            items: self.items.0,
            team_members: self.team_members.0,
            start_date: self.start_date,
            end_date: self.end_date,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

