//! Workflow template rows.

use procura_core::template::{TemplateStep, WorkflowTemplate};
use procura_core::types::{DbId, Timestamp};
use procura_core::WorkflowError;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `workflow_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowTemplateRow {
    pub id: DbId,
    pub name: String,
    pub document_type: String,
    pub category: Option<String>,
    pub steps: Json<Vec<TemplateStep>>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkflowTemplateRow {
    pub fn into_domain(self) -> Result<WorkflowTemplate, WorkflowError> {
        Ok(WorkflowTemplate {
            name: self.name,
            document_type: self.document_type,
            category: self.category,
            steps: self.steps.0,
            is_active: self.is_active,
        })
    }
}

/// DTO for registering a template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflowTemplate {
    pub name: String,
    pub document_type: String,
    pub category: Option<String>,
    pub steps: Vec<TemplateStep>,
}
