// Action abstraction for the workflow engine
//
// Actions are the executable units of a workflow's step list. They are
// defined via the `Action` trait and resolved through an `ActionRegistry`
// populated at process start, so adding an action kind means adding an
// implementation plus a registration - never type-specific branching in
// the engine.
//
// Design decisions:
// - Expected failures (missing required params, transport errors) are
//   reported as an unsuccessful ActionResult, never as Err or a panic;
//   only programming errors may propagate as faults
// - The registry hands out Arc'd trait objects so one instance serves
//   concurrent executions

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Result, WorkflowError};

mod http_request;
mod log_message;

pub use http_request::HttpRequestAction;
pub use log_message::LogMessageAction;

// ============================================================================
// Action contract
// ============================================================================

/// Context handed to an action for one step execution
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Workflow being executed
    pub workflow_id: Uuid,
    /// Step index being executed
    pub step: u32,
    /// The action's own configuration, copied verbatim from the workflow
    pub params: Map<String, Value>,
}

/// Outcome of one action execution. Transient, never persisted.
#[derive(Debug, Clone, Default)]
pub struct ActionResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ActionResult {
    /// Successful execution without a payload
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Successful execution with a payload
    pub fn ok_with(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Expected failure carrying a message for the execution state
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Trait for implementing workflow actions.
///
/// Implementations must be pluggable without engine changes: the engine
/// dispatches purely through this trait.
#[async_trait]
pub trait Action: Send + Sync {
    /// Registered type name, as it appears in workflow definitions
    fn action_type(&self) -> &str;

    /// Execute the action against the given context.
    ///
    /// Must not return faults for expected failures - report them via
    /// `ActionResult::fail`.
    async fn execute(&self, context: &ActionContext) -> ActionResult;
}

impl std::fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("action_type", &self.action_type())
            .finish()
    }
}

// ============================================================================
// ActionRegistry
// ============================================================================

/// Registry mapping action type names to executable actions.
///
/// Populated at process start; `with_defaults` registers the two built-in
/// action kinds.
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Registry with the built-in actions (httpRequest, logMessage)
    pub fn with_defaults() -> Self {
        Self::builder()
            .action(HttpRequestAction::new())
            .action(LogMessageAction)
            .build()
    }

    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder {
            registry: Self::new(),
        }
    }

    /// Register an action under its self-reported type name
    pub fn register(&mut self, action: impl Action + 'static) {
        self.actions
            .insert(action.action_type().to_string(), Arc::new(action));
    }

    /// Resolve an action type name to an executable action
    pub fn resolve(&self, action_type: &str) -> Result<Arc<dyn Action>> {
        self.actions
            .get(action_type)
            .cloned()
            .ok_or_else(|| WorkflowError::unknown_action(action_type))
    }

    /// Registered type names
    pub fn action_types(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Builder for constructing an `ActionRegistry`
pub struct ActionRegistryBuilder {
    registry: ActionRegistry,
}

impl ActionRegistryBuilder {
    /// Add an action to the registry
    pub fn action(mut self, action: impl Action + 'static) -> Self {
        self.registry.register(action);
        self
    }

    pub fn build(self) -> ActionRegistry {
        self.registry
    }
}
