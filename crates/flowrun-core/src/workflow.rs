// Workflow domain types
//
// These are DB-agnostic entity types used by the API, worker, and engine.
// The trigger is an internally tagged union: an unsupported trigger type
// fails deserialization at the API boundary, so the engine never sees one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Condition that schedules a workflow for execution.
///
/// Wire format matches the stored jsonb column:
/// `{"type": "time-based", "params": {"interval": "daily"}}` or
/// `{"type": "webhook", "params": {}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "type", content = "params")]
pub enum Trigger {
    /// Re-evaluated once per minute by the time-trigger producer
    #[serde(rename = "time-based")]
    TimeBased {
        /// Informational label (e.g. "daily", "monthly"); a trigger without
        /// an interval is treated as one-time in producer logs
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<String>,
    },
    /// Executed synchronously on demand, bypassing the queue
    #[serde(rename = "webhook")]
    Webhook {},
}

impl Trigger {
    /// Wire name of the trigger type
    pub fn type_name(&self) -> &'static str {
        match self {
            Trigger::TimeBased { .. } => "time-based",
            Trigger::Webhook {} => "webhook",
        }
    }

    pub fn is_time_based(&self) -> bool {
        matches!(self, Trigger::TimeBased { .. })
    }
}

/// One executable unit within a workflow's ordered step list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ActionSpec {
    /// Registered action type name (e.g. "httpRequest", "logMessage")
    #[serde(rename = "type")]
    pub action_type: String,
    /// Action-specific configuration, passed verbatim to the action
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub params: Map<String, Value>,
}

impl ActionSpec {
    pub fn new(action_type: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            action_type: action_type.into(),
            params,
        }
    }
}

/// A stored workflow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub trigger: Trigger,
    /// Ordered step list; may be empty
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    /// Denormalized copy of the most recent execution state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution_state: Option<crate::state::ExecutionState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a workflow definition at construction time.
///
/// Pure function returning the full list of issues rather than failing on
/// the first one. The trigger type itself is enforced structurally by the
/// `Trigger` enum, so by the time a value reaches this function the tag is
/// already one of the supported kinds.
pub fn validate_definition(name: &str, _trigger: &Trigger) -> Result<(), Vec<String>> {
    let mut issues = Vec::new();

    if name.trim().is_empty() {
        issues.push("Name must be provided and cannot be empty".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
