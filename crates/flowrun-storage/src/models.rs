// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use flowrun_core::{ActionSpec, ExecutionState, Trigger, Workflow};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct WorkflowRow {
    pub id: Uuid,
    pub name: String,
    pub trigger: Json<Trigger>,
    pub actions: Option<Json<Vec<ActionSpec>>>,
    pub last_execution_state: Option<Json<ExecutionState>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkflowRow> for Workflow {
    fn from(row: WorkflowRow) -> Self {
        Workflow {
            id: row.id,
            name: row.name,
            trigger: row.trigger.0,
            actions: row.actions.map(|a| a.0).unwrap_or_default(),
            last_execution_state: row.last_execution_state.map(|s| s.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateWorkflow {
    pub name: String,
    pub trigger: Trigger,
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateWorkflow {
    pub name: Option<String>,
    pub trigger: Option<Trigger>,
    pub actions: Option<Vec<ActionSpec>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn row_maps_to_domain_workflow() {
        let now = Utc::now();
        let row = WorkflowRow {
            id: Uuid::now_v7(),
            name: "Daily Report Generator".to_string(),
            trigger: Json(Trigger::TimeBased {
                interval: Some("daily".to_string()),
            }),
            actions: Some(Json(vec![ActionSpec::new("logMessage", Map::new())])),
            last_execution_state: Some(Json(ExecutionState::at_step(1))),
            created_at: now,
            updated_at: now,
        };

        let workflow: Workflow = row.into();
        assert_eq!(workflow.name, "Daily Report Generator");
        assert_eq!(workflow.actions.len(), 1);
        assert_eq!(workflow.last_execution_state, Some(ExecutionState::at_step(1)));
    }

    #[test]
    fn null_actions_column_maps_to_an_empty_list() {
        let now = Utc::now();
        let row = WorkflowRow {
            id: Uuid::now_v7(),
            name: "Webhook Example".to_string(),
            trigger: Json(Trigger::Webhook {}),
            actions: None,
            last_execution_state: None,
            created_at: now,
            updated_at: now,
        };

        let workflow: Workflow = row.into();
        assert!(workflow.actions.is_empty());
        assert!(workflow.last_execution_state.is_none());
    }
}
