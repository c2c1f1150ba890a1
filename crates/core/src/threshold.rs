//! Budget threshold classifier.
//!
//! Pure mapping from (budget, department kind) to the approval tier that
//! governs how many levels the chain must contain. Invoked once at project
//! creation and cached on the entity; never recomputed after save unless
//! the threshold is unset.

use crate::types::{BudgetThreshold, DepartmentKind};

/// Budgets at or below this are auto-approved by the creator's HOD.
pub const HOD_AUTO_APPROVE_LIMIT: i64 = 1_000_000;

/// Budgets at or below this require department-level approval.
pub const DEPARTMENT_APPROVAL_LIMIT: i64 = 5_000_000;

/// Budgets at or below this require finance review; above, executive.
pub const FINANCE_APPROVAL_LIMIT: i64 = 25_000_000;

/// Classify a budget into its approval tier.
///
/// The Finance department's own requests skip the finance-review tiers
/// and escalate straight to executive approval, since Finance would
/// otherwise be reviewing itself.
pub fn classify(budget: i64, department: DepartmentKind) -> BudgetThreshold {
    if budget <= HOD_AUTO_APPROVE_LIMIT {
        return BudgetThreshold::HodAutoApprove;
    }
    let finance_own_request = department == DepartmentKind::Finance;
    if budget <= DEPARTMENT_APPROVAL_LIMIT {
        if finance_own_request {
            BudgetThreshold::ExecutiveApproval
        } else {
            BudgetThreshold::DepartmentApproval
        }
    } else if budget <= FINANCE_APPROVAL_LIMIT {
        if finance_own_request {
            BudgetThreshold::ExecutiveApproval
        } else {
            BudgetThreshold::FinanceApproval
        }
    } else {
        BudgetThreshold::ExecutiveApproval
    }
}
