// Execution state: the mutable cursor + status + error for a workflow run
//
// Absence of a state record means the workflow has not started (step 0).
// Status stays unset while a workflow is progressing; the engine only ever
// writes "completed" or "failed". Updates are full replacements, so a
// successful step naturally drops a previous failure's status and error.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Terminal status of a workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

/// Progress of one workflow's execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ExecutionState {
    /// Zero-based cursor into the workflow's action list
    #[serde(default)]
    pub step: u32,
    /// Unset while the workflow is still progressing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    /// Set only when status is "failed"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionState {
    /// State with the cursor at the given step, no status
    pub fn at_step(step: u32) -> Self {
        Self {
            step,
            status: None,
            error: None,
        }
    }

    /// Terminal completed state
    pub fn completed() -> Self {
        Self {
            step: 0,
            status: Some(ExecutionStatus::Completed),
            error: None,
        }
    }

    /// Terminal failed state carrying the action's error message
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            step: 0,
            status: Some(ExecutionStatus::Failed),
            error: Some(error.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(ExecutionStatus::Completed)
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(ExecutionStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_fields_are_skipped_on_the_wire() {
        let state = ExecutionState::at_step(2);
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({"step": 2}));
    }

    #[test]
    fn terminal_states_serialize_with_lowercase_status() {
        assert_eq!(
            serde_json::to_value(ExecutionState::completed()).unwrap(),
            json!({"step": 0, "status": "completed"})
        );
        assert_eq!(
            serde_json::to_value(ExecutionState::failed("boom")).unwrap(),
            json!({"step": 0, "status": "failed", "error": "boom"})
        );
    }

    #[test]
    fn missing_step_defaults_to_zero() {
        let state: ExecutionState = serde_json::from_value(json!({"status": "failed"})).unwrap();
        assert_eq!(state.step, 0);
        assert!(state.is_failed());
        assert!(!state.is_completed());
    }
}
