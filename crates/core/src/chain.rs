//! Approval chain generation.
//!
//! Each project scope has its own chain rule; the rule builds an ordered
//! list of pending steps from a [`ChainContext`] of typed department
//! handles. Chains are generated once and persisted on the project;
//! mutating scope or budget afterwards does not regenerate the chain.

use serde::{Deserialize, Serialize};

use crate::types::{
    ApprovalLevel, BudgetThreshold, DbId, DepartmentRef, ProjectScope, StepStatus, Timestamp,
};

/// Role level at or above which a creator bypasses the whole chain.
pub const TOP_TIER_ROLE_LEVEL: i32 = 1000;

// ---------------------------------------------------------------------------
// Step record
// ---------------------------------------------------------------------------

/// A single step in a project's approval chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalStep {
    pub level: ApprovalLevel,
    pub department_id: DbId,
    pub department_name: String,
    /// User who resolved the step, once it is approved or rejected.
    pub approver: Option<DbId>,
    pub status: StepStatus,
    pub comments: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub required: bool,
}

impl ApprovalStep {
    fn pending(level: ApprovalLevel, department: &DepartmentRef) -> Self {
        ApprovalStep {
            level,
            department_id: department.id,
            department_name: department.name.clone(),
            approver: None,
            status: StepStatus::Pending,
            comments: None,
            approved_at: None,
            required: true,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == StepStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Generation context
// ---------------------------------------------------------------------------

/// Who created the project, for self-approval elision.
#[derive(Debug, Clone)]
pub struct CreatorProfile {
    pub user_id: DbId,
    pub role_level: i32,
    pub department_id: DbId,
}

/// Typed department handles resolved by the directory port.
#[derive(Debug, Clone)]
pub struct ChainDepartments {
    /// The creator's own department.
    pub creator: DepartmentRef,
    pub project_management: DepartmentRef,
    pub legal_compliance: DepartmentRef,
    pub finance: DepartmentRef,
    pub executive: DepartmentRef,
}

/// Everything chain generation needs, with no ambient lookups.
#[derive(Debug, Clone)]
pub struct ChainContext<'a> {
    pub scope: ProjectScope,
    pub threshold: BudgetThreshold,
    pub requires_budget_allocation: bool,
    pub creator: &'a CreatorProfile,
    pub departments: &'a ChainDepartments,
}

impl ChainContext<'_> {
    /// Whether the full review chain applies: finance/executive tier, or
    /// any project needing a budget allocation.
    pub fn full_chain(&self) -> bool {
        matches!(
            self.threshold,
            BudgetThreshold::FinanceApproval | BudgetThreshold::ExecutiveApproval
        ) || self.requires_budget_allocation
    }

    /// A step is omitted entirely, not auto-approved, when the creator is
    /// the HOD of the step's department.
    fn elided(&self, department: &DepartmentRef) -> bool {
        department.hod_user_id == Some(self.creator.user_id)
    }
}

// ---------------------------------------------------------------------------
// Chain rules
// ---------------------------------------------------------------------------

/// Scope-specific chain construction, one variant per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRule {
    Personal,
    Departmental,
    External,
}

impl ChainRule {
    pub fn for_scope(scope: ProjectScope) -> Self {
        match scope {
            ProjectScope::Personal => ChainRule::Personal,
            ProjectScope::Departmental => ChainRule::Departmental,
            ProjectScope::External => ChainRule::External,
        }
    }

    /// Build the ordered step list for this rule.
    ///
    /// Self-approval elision applies uniformly: any step whose department
    /// the creator heads is skipped. Top-tier creators are handled by
    /// [`generate_chain`], which never calls into the rules for them.
    pub fn build_steps(&self, ctx: &ChainContext<'_>) -> Vec<ApprovalStep> {
        let d = ctx.departments;
        let mut steps = Vec::new();
        let mut push = |level: ApprovalLevel, department: &DepartmentRef| {
            if !ctx.elided(department) {
                steps.push(ApprovalStep::pending(level, department));
            }
        };

        match self {
            ChainRule::Personal => {
                push(ApprovalLevel::DepartmentHod, &d.creator);
                push(ApprovalLevel::ProjectManagement, &d.project_management);
                if ctx.requires_budget_allocation {
                    push(ApprovalLevel::LegalCompliance, &d.legal_compliance);
                }
                if ctx.full_chain() {
                    push(ApprovalLevel::Finance, &d.finance);
                }
                if ctx.threshold == BudgetThreshold::ExecutiveApproval {
                    push(ApprovalLevel::Executive, &d.executive);
                }
                if ctx.requires_budget_allocation {
                    push(ApprovalLevel::BudgetAllocation, &d.finance);
                }
            }
            ChainRule::Departmental => {
                let full = ctx.full_chain();
                if full {
                    push(ApprovalLevel::ProjectManagement, &d.project_management);
                }
                push(ApprovalLevel::DepartmentHod, &d.creator);
                if full {
                    push(ApprovalLevel::Finance, &d.finance);
                    push(ApprovalLevel::Executive, &d.executive);
                }
            }
            ChainRule::External => {
                let full = ctx.full_chain();
                push(ApprovalLevel::ProjectManagement, &d.project_management);
                if full {
                    push(ApprovalLevel::LegalCompliance, &d.legal_compliance);
                }
                if full && ctx.requires_budget_allocation {
                    push(ApprovalLevel::Finance, &d.finance);
                }
                if full {
                    push(ApprovalLevel::Executive, &d.executive);
                }
                if full && ctx.requires_budget_allocation {
                    push(ApprovalLevel::BudgetAllocation, &d.finance);
                }
            }
        }
        steps
    }
}

/// Produce the ordered approval chain for a project.
///
/// Top-tier creators (role level >= [`TOP_TIER_ROLE_LEVEL`]) bypass every
/// step and get an empty chain.
pub fn generate_chain(ctx: &ChainContext<'_>) -> Vec<ApprovalStep> {
    if ctx.creator.role_level >= TOP_TIER_ROLE_LEVEL {
        return Vec::new();
    }
    ChainRule::for_scope(ctx.scope).build_steps(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DepartmentKind;

    fn dept(id: DbId, name: &str, kind: DepartmentKind, hod: Option<DbId>) -> DepartmentRef {
        DepartmentRef {
            id,
            name: name.to_string(),
            kind,
            hod_user_id: hod,
        }
    }

    fn departments() -> ChainDepartments {
        ChainDepartments {
            creator: dept(1, "Engineering", DepartmentKind::General, Some(10)),
            project_management: dept(2, "Project Management", DepartmentKind::ProjectManagement, Some(20)),
            legal_compliance: dept(3, "Legal & Compliance", DepartmentKind::LegalCompliance, Some(30)),
            finance: dept(4, "Finance & Accounting", DepartmentKind::Finance, Some(40)),
            executive: dept(5, "Executive Office", DepartmentKind::Executive, Some(50)),
        }
    }

    fn staff_creator() -> CreatorProfile {
        CreatorProfile {
            user_id: 100,
            role_level: 300,
            department_id: 1,
        }
    }

    fn ctx<'a>(
        scope: ProjectScope,
        threshold: BudgetThreshold,
        requires_budget_allocation: bool,
        creator: &'a CreatorProfile,
        departments: &'a ChainDepartments,
    ) -> ChainContext<'a> {
        ChainContext {
            scope,
            threshold,
            requires_budget_allocation,
            creator,
            departments,
        }
    }

    fn levels(steps: &[ApprovalStep]) -> Vec<ApprovalLevel> {
        steps.iter().map(|s| s.level).collect()
    }

    #[test]
    fn personal_low_budget_chain_is_hod_then_pm() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::Personal,
            BudgetThreshold::HodAutoApprove,
            false,
            &creator,
            &depts,
        ));
        assert_eq!(
            levels(&steps),
            vec![ApprovalLevel::DepartmentHod, ApprovalLevel::ProjectManagement]
        );
    }

    #[test]
    fn personal_with_allocation_includes_legal_and_allocation_steps() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::Personal,
            BudgetThreshold::ExecutiveApproval,
            true,
            &creator,
            &depts,
        ));
        assert_eq!(
            levels(&steps),
            vec![
                ApprovalLevel::DepartmentHod,
                ApprovalLevel::ProjectManagement,
                ApprovalLevel::LegalCompliance,
                ApprovalLevel::Finance,
                ApprovalLevel::Executive,
                ApprovalLevel::BudgetAllocation,
            ]
        );
    }

    #[test]
    fn all_generated_steps_are_pending_and_required() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::External,
            BudgetThreshold::ExecutiveApproval,
            true,
            &creator,
            &depts,
        ));
        assert!(!steps.is_empty());
        for step in &steps {
            assert_eq!(step.status, StepStatus::Pending);
            assert!(step.required);
            assert!(step.approver.is_none());
            assert!(step.approved_at.is_none());
        }
    }

    #[test]
    fn top_tier_creator_gets_empty_chain() {
        let creator = CreatorProfile {
            user_id: 100,
            role_level: TOP_TIER_ROLE_LEVEL,
            department_id: 1,
        };
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::External,
            BudgetThreshold::ExecutiveApproval,
            true,
            &creator,
            &depts,
        ));
        assert!(steps.is_empty());
    }

    #[test]
    fn creator_who_heads_own_department_skips_hod_step() {
        let creator = CreatorProfile {
            user_id: 10, // HOD of Engineering in the fixture
            role_level: 700,
            department_id: 1,
        };
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::Personal,
            BudgetThreshold::HodAutoApprove,
            false,
            &creator,
            &depts,
        ));
        assert_eq!(levels(&steps), vec![ApprovalLevel::ProjectManagement]);
    }

    #[test]
    fn pm_member_who_is_not_pm_hod_still_gets_pm_step() {
        let creator = CreatorProfile {
            user_id: 21, // in PM department, but HOD is user 20
            role_level: 400,
            department_id: 2,
        };
        let mut depts = departments();
        depts.creator = depts.project_management.clone();
        let steps = generate_chain(&ctx(
            ProjectScope::Personal,
            BudgetThreshold::HodAutoApprove,
            false,
            &creator,
            &depts,
        ));
        assert!(levels(&steps).contains(&ApprovalLevel::ProjectManagement));
    }

    #[test]
    fn departmental_small_budget_is_hod_only() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::Departmental,
            BudgetThreshold::DepartmentApproval,
            false,
            &creator,
            &depts,
        ));
        assert_eq!(levels(&steps), vec![ApprovalLevel::DepartmentHod]);
    }

    #[test]
    fn departmental_full_chain_adds_pm_finance_executive() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::Departmental,
            BudgetThreshold::FinanceApproval,
            false,
            &creator,
            &depts,
        ));
        assert_eq!(
            levels(&steps),
            vec![
                ApprovalLevel::ProjectManagement,
                ApprovalLevel::DepartmentHod,
                ApprovalLevel::Finance,
                ApprovalLevel::Executive,
            ]
        );
    }

    #[test]
    fn departmental_allocation_forces_full_chain() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::Departmental,
            BudgetThreshold::DepartmentApproval,
            true,
            &creator,
            &depts,
        ));
        assert_eq!(levels(&steps).len(), 4);
    }

    #[test]
    fn external_simple_chain_is_pm_only() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::External,
            BudgetThreshold::DepartmentApproval,
            false,
            &creator,
            &depts,
        ));
        assert_eq!(levels(&steps), vec![ApprovalLevel::ProjectManagement]);
    }

    #[test]
    fn external_full_chain_with_allocation_has_five_steps() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::External,
            BudgetThreshold::ExecutiveApproval,
            true,
            &creator,
            &depts,
        ));
        assert_eq!(
            levels(&steps),
            vec![
                ApprovalLevel::ProjectManagement,
                ApprovalLevel::LegalCompliance,
                ApprovalLevel::Finance,
                ApprovalLevel::Executive,
                ApprovalLevel::BudgetAllocation,
            ]
        );
    }

    #[test]
    fn external_full_chain_without_allocation_skips_finance() {
        let creator = staff_creator();
        let depts = departments();
        let steps = generate_chain(&ctx(
            ProjectScope::External,
            BudgetThreshold::FinanceApproval,
            false,
            &creator,
            &depts,
        ));
        assert_eq!(
            levels(&steps),
            vec![
                ApprovalLevel::ProjectManagement,
                ApprovalLevel::LegalCompliance,
                ApprovalLevel::Executive,
            ]
        );
    }

    #[test]
    fn elision_applies_to_finance_steps_too() {
        let creator = CreatorProfile {
            user_id: 40, // Finance HOD in the fixture
            role_level: 700,
            department_id: 4,
        };
        let mut depts = departments();
        depts.creator = depts.finance.clone();
        let steps = generate_chain(&ctx(
            ProjectScope::Personal,
            BudgetThreshold::ExecutiveApproval,
            true,
            &creator,
            &depts,
        ));
        let lv = levels(&steps);
        // DepartmentHod (finance), Finance, and BudgetAllocation all elide.
        assert!(!lv.contains(&ApprovalLevel::Finance));
        assert!(!lv.contains(&ApprovalLevel::DepartmentHod));
        assert!(!lv.contains(&ApprovalLevel::BudgetAllocation));
        assert!(lv.contains(&ApprovalLevel::ProjectManagement));
        assert!(lv.contains(&ApprovalLevel::Executive));
    }
}
