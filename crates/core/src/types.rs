//! Shared identifier, timestamp, and enumeration types for the domain.
//!
//! Enums serialize as `snake_case` strings; the same strings are stored in
//! text columns, so every enum exposes `as_str` and implements [`FromStr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Database identifier (BIGSERIAL).
pub type DbId = i64;

/// UTC timestamp used across the domain.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

// ---------------------------------------------------------------------------
// Project scope
// ---------------------------------------------------------------------------

/// Determines which chain-generation rule applies to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectScope {
    Personal,
    Departmental,
    External,
}

impl ProjectScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectScope::Personal => "personal",
            ProjectScope::Departmental => "departmental",
            ProjectScope::External => "external",
        }
    }
}

impl FromStr for ProjectScope {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(ProjectScope::Personal),
            "departmental" => Ok(ProjectScope::Departmental),
            "external" => Ok(ProjectScope::External),
            other => Err(WorkflowError::Validation(format!(
                "unknown project scope '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Budget threshold
// ---------------------------------------------------------------------------

/// Budget-derived tier controlling how many approval levels are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetThreshold {
    HodAutoApprove,
    DepartmentApproval,
    FinanceApproval,
    ExecutiveApproval,
}

impl BudgetThreshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetThreshold::HodAutoApprove => "hod_auto_approve",
            BudgetThreshold::DepartmentApproval => "department_approval",
            BudgetThreshold::FinanceApproval => "finance_approval",
            BudgetThreshold::ExecutiveApproval => "executive_approval",
        }
    }
}

impl FromStr for BudgetThreshold {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hod_auto_approve" => Ok(BudgetThreshold::HodAutoApprove),
            "department_approval" => Ok(BudgetThreshold::DepartmentApproval),
            "finance_approval" => Ok(BudgetThreshold::FinanceApproval),
            "executive_approval" => Ok(BudgetThreshold::ExecutiveApproval),
            other => Err(WorkflowError::Validation(format!(
                "unknown budget threshold '{other}'"
            ))),
        }
    }
}

impl fmt::Display for BudgetThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Workflow phase
// ---------------------------------------------------------------------------

/// The five project lifecycle phases, totally ordered.
///
/// Phases only move forward; see [`crate::phase::validate_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Planning,
    Approval,
    Implementation,
    Execution,
    Completion,
}

impl WorkflowPhase {
    /// Position in the total order (planning = 0, completion = 4).
    pub fn ordinal(&self) -> u8 {
        match self {
            WorkflowPhase::Planning => 0,
            WorkflowPhase::Approval => 1,
            WorkflowPhase::Implementation => 2,
            WorkflowPhase::Execution => 3,
            WorkflowPhase::Completion => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Planning => "planning",
            WorkflowPhase::Approval => "approval",
            WorkflowPhase::Implementation => "implementation",
            WorkflowPhase::Execution => "execution",
            WorkflowPhase::Completion => "completion",
        }
    }
}

impl FromStr for WorkflowPhase {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(WorkflowPhase::Planning),
            "approval" => Ok(WorkflowPhase::Approval),
            "implementation" => Ok(WorkflowPhase::Implementation),
            "execution" => Ok(WorkflowPhase::Execution),
            "completion" => Ok(WorkflowPhase::Completion),
            other => Err(WorkflowError::Validation(format!(
                "unknown workflow phase '{other}'"
            ))),
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Approval level
// ---------------------------------------------------------------------------

/// The approval levels a chain step can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
    DepartmentHod,
    ProjectManagement,
    LegalCompliance,
    Finance,
    Executive,
    BudgetAllocation,
}

impl ApprovalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalLevel::DepartmentHod => "department_hod",
            ApprovalLevel::ProjectManagement => "project_management",
            ApprovalLevel::LegalCompliance => "legal_compliance",
            ApprovalLevel::Finance => "finance",
            ApprovalLevel::Executive => "executive",
            ApprovalLevel::BudgetAllocation => "budget_allocation",
        }
    }

    /// The `pending_<level>_approval` status consumers use to know who to
    /// notify next.
    pub fn pending_status(&self) -> ProjectStatus {
        match self {
            ApprovalLevel::DepartmentHod => ProjectStatus::PendingDepartmentHodApproval,
            ApprovalLevel::ProjectManagement => ProjectStatus::PendingProjectManagementApproval,
            ApprovalLevel::LegalCompliance => ProjectStatus::PendingLegalComplianceApproval,
            ApprovalLevel::Finance => ProjectStatus::PendingFinanceApproval,
            ApprovalLevel::Executive => ProjectStatus::PendingExecutiveApproval,
            ApprovalLevel::BudgetAllocation => ProjectStatus::PendingBudgetAllocation,
        }
    }
}

impl FromStr for ApprovalLevel {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "department_hod" => Ok(ApprovalLevel::DepartmentHod),
            "project_management" => Ok(ApprovalLevel::ProjectManagement),
            "legal_compliance" => Ok(ApprovalLevel::LegalCompliance),
            "finance" => Ok(ApprovalLevel::Finance),
            "executive" => Ok(ApprovalLevel::Executive),
            "budget_allocation" => Ok(ApprovalLevel::BudgetAllocation),
            other => Err(WorkflowError::Validation(format!(
                "unknown approval level '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Step status
// ---------------------------------------------------------------------------

/// Status of a single approval chain step (also used for document approval).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Approved,
    Rejected,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Approved => "approved",
            StepStatus::Rejected => "rejected",
            StepStatus::Skipped => "skipped",
        }
    }
}

// ---------------------------------------------------------------------------
// Project status
// ---------------------------------------------------------------------------

/// Broad project status covering planning through completion, rejection,
/// and resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    PendingDepartmentHodApproval,
    PendingProjectManagementApproval,
    PendingLegalComplianceApproval,
    PendingFinanceApproval,
    PendingExecutiveApproval,
    PendingBudgetAllocation,
    RevisionRequired,
    Approved,
    Implementation,
    InProgress,
    Active,
    Completed,
    Rejected,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::PendingDepartmentHodApproval => "pending_department_hod_approval",
            ProjectStatus::PendingProjectManagementApproval => {
                "pending_project_management_approval"
            }
            ProjectStatus::PendingLegalComplianceApproval => "pending_legal_compliance_approval",
            ProjectStatus::PendingFinanceApproval => "pending_finance_approval",
            ProjectStatus::PendingExecutiveApproval => "pending_executive_approval",
            ProjectStatus::PendingBudgetAllocation => "pending_budget_allocation",
            ProjectStatus::RevisionRequired => "revision_required",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Implementation => "implementation",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Rejected => "rejected",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Whether implementation-phase task progress counts toward the
    /// project's progress numbers.
    pub fn counts_implementation_progress(&self) -> bool {
        matches!(
            self,
            ProjectStatus::Implementation
                | ProjectStatus::InProgress
                | ProjectStatus::Active
                | ProjectStatus::Completed
        )
    }
}

impl FromStr for ProjectStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(ProjectStatus::Planning),
            "pending_department_hod_approval" => Ok(ProjectStatus::PendingDepartmentHodApproval),
            "pending_project_management_approval" => {
                Ok(ProjectStatus::PendingProjectManagementApproval)
            }
            "pending_legal_compliance_approval" => {
                Ok(ProjectStatus::PendingLegalComplianceApproval)
            }
            "pending_finance_approval" => Ok(ProjectStatus::PendingFinanceApproval),
            "pending_executive_approval" => Ok(ProjectStatus::PendingExecutiveApproval),
            "pending_budget_allocation" => Ok(ProjectStatus::PendingBudgetAllocation),
            "revision_required" => Ok(ProjectStatus::RevisionRequired),
            "approved" => Ok(ProjectStatus::Approved),
            "implementation" => Ok(ProjectStatus::Implementation),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "rejected" => Ok(ProjectStatus::Rejected),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            other => Err(WorkflowError::Validation(format!(
                "unknown project status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

/// Functional classification of a department.
///
/// Chain generation and notification targeting key off this kind rather
/// than matching on department display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentKind {
    Finance,
    Executive,
    ProjectManagement,
    LegalCompliance,
    Operations,
    Procurement,
    General,
}

impl DepartmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartmentKind::Finance => "finance",
            DepartmentKind::Executive => "executive",
            DepartmentKind::ProjectManagement => "project_management",
            DepartmentKind::LegalCompliance => "legal_compliance",
            DepartmentKind::Operations => "operations",
            DepartmentKind::Procurement => "procurement",
            DepartmentKind::General => "general",
        }
    }
}

impl fmt::Display for DepartmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepartmentKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finance" => Ok(DepartmentKind::Finance),
            "executive" => Ok(DepartmentKind::Executive),
            "project_management" => Ok(DepartmentKind::ProjectManagement),
            "legal_compliance" => Ok(DepartmentKind::LegalCompliance),
            "operations" => Ok(DepartmentKind::Operations),
            "procurement" => Ok(DepartmentKind::Procurement),
            "general" => Ok(DepartmentKind::General),
            other => Err(WorkflowError::Validation(format!(
                "unknown department kind '{other}'"
            ))),
        }
    }
}

/// A resolved, typed department handle.
///
/// Produced by the directory port so the domain never matches on display
/// names like "Finance & Accounting".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub id: DbId,
    pub name: String,
    pub kind: DepartmentKind,
    /// Head of department, if one is assigned.
    pub hod_user_id: Option<DbId>,
}
