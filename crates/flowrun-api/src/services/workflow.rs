// Workflow command service: CRUD with domain validation
//
// Validation runs here, at construction time, as a pure function over the
// definition fields. The engine never validates; by the time a workflow
// reaches it the definition is already well-formed.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use flowrun_core::{validate_definition, Result, Workflow, WorkflowError};
use flowrun_storage::{CreateWorkflow, Database, UpdateWorkflow};

use crate::workflows::{CreateWorkflowRequest, UpdateWorkflowRequest};

pub struct WorkflowService {
    db: Arc<Database>,
}

impl WorkflowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: CreateWorkflowRequest) -> Result<Workflow> {
        validate_definition(&req.name, &req.trigger).map_err(WorkflowError::validation)?;

        let row = self.db.create_workflow(create_input(req)).await?;
        info!(workflow_id = %row.id, "Workflow created");
        Ok(row.into())
    }

    pub async fn list(&self) -> Result<Vec<Workflow>> {
        let rows = self.db.list_workflows().await?;
        info!(count = rows.len(), "Found workflows");
        Ok(rows.into_iter().map(Workflow::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Workflow>> {
        let row = self.db.get_workflow(id).await?;
        Ok(row.map(Workflow::from))
    }

    pub async fn update(&self, id: Uuid, req: UpdateWorkflowRequest) -> Result<Workflow> {
        let existing = self
            .db
            .get_workflow(id)
            .await?
            .ok_or(WorkflowError::WorkflowNotFound(id))?;

        // Re-validate the definition whenever name or trigger changes
        if req.name.is_some() || req.trigger.is_some() {
            let name = req.name.as_deref().unwrap_or(&existing.name);
            let trigger = req.trigger.as_ref().unwrap_or(&existing.trigger.0);
            validate_definition(name, trigger).map_err(WorkflowError::validation)?;
        }

        let row = self
            .db
            .update_workflow(id, update_input(req))
            .await?
            .ok_or(WorkflowError::WorkflowNotFound(id))?;
        info!(workflow_id = %id, "Workflow updated");
        Ok(row.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.db.delete_workflow(id).await?;
        if deleted {
            info!(workflow_id = %id, "Workflow deleted");
        }
        Ok(deleted)
    }
}

/// Map a create request to the storage input; an omitted action list
/// becomes an empty one
fn create_input(req: CreateWorkflowRequest) -> CreateWorkflow {
    CreateWorkflow {
        name: req.name,
        trigger: req.trigger,
        actions: req.actions.unwrap_or_default(),
    }
}

/// Map an update request to the storage input; omitted fields stay `None`
/// so the update leaves them untouched
fn update_input(req: UpdateWorkflowRequest) -> UpdateWorkflow {
    UpdateWorkflow {
        name: req.name,
        trigger: req.trigger,
        actions: req.actions,
    }
}
