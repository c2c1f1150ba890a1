//! Declarative workflow templates.
//!
//! Secondary, extensible mechanism for chain parametrization: a template
//! matches on document type/category/budget/department and expands to an
//! ordered list of approval levels. The primary project path generates
//! chains procedurally via [`crate::chain`]; templates exist for
//! non-project document flows and future configurability.

use serde::{Deserialize, Serialize};

use crate::types::{ApprovalLevel, DepartmentKind};

/// Conditions gating a template step. All present fields must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepCondition {
    pub min_budget: Option<i64>,
    pub max_budget: Option<i64>,
    pub department_kind: Option<DepartmentKind>,
}

impl StepCondition {
    fn matches(&self, budget: i64, department: DepartmentKind) -> bool {
        if let Some(min) = self.min_budget {
            if budget < min {
                return false;
            }
        }
        if let Some(max) = self.max_budget {
            if budget > max {
                return false;
            }
        }
        if let Some(kind) = self.department_kind {
            if kind != department {
                return false;
            }
        }
        true
    }
}

/// One declarative step in a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStep {
    pub order: u32,
    pub level: ApprovalLevel,
    /// Unconditional when absent.
    pub condition: Option<StepCondition>,
}

/// A declarative, conditionable step list keyed by document type and
/// category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub name: String,
    pub document_type: String,
    pub category: Option<String>,
    pub steps: Vec<TemplateStep>,
    pub is_active: bool,
}

impl WorkflowTemplate {
    /// Whether this template applies to the given document.
    pub fn matches(&self, document_type: &str, category: Option<&str>) -> bool {
        self.is_active
            && self.document_type == document_type
            && match (&self.category, category) {
                (None, _) => true,
                (Some(own), Some(given)) => own == given,
                (Some(_), None) => false,
            }
    }

    /// Expand the template into the ordered levels whose conditions hold.
    pub fn expand(&self, budget: i64, department: DepartmentKind) -> Vec<ApprovalLevel> {
        let mut steps: Vec<&TemplateStep> = self
            .steps
            .iter()
            .filter(|s| {
                s.condition
                    .as_ref()
                    .map(|c| c.matches(budget, department))
                    .unwrap_or(true)
            })
            .collect();
        steps.sort_by_key(|s| s.order);
        steps.into_iter().map(|s| s.level).collect()
    }
}
