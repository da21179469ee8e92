// Error types for workflow execution

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors that can occur while defining or executing workflows
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Workflow definition rejected at construction time
    #[error("Invalid workflow definition: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Workflow not found in the durable store.
    /// This propagates out of the engine as a fault so the queue worker's
    /// delivery retry applies to it.
    #[error("Workflow {0} not found")]
    WorkflowNotFound(Uuid),

    /// Action type not present in the registry
    #[error("No action found for type: {0}")]
    UnknownActionType(String),

    /// An action reported an expected failure.
    /// The engine records the message in the execution state and swallows
    /// the error, so the display form is the bare message.
    #[error("{0}")]
    ActionExecution(String),

    /// Execution state could not be serialized or deserialized
    #[error("Execution state serialization error: {0}")]
    StateSerialization(#[from] serde_json::Error),

    /// Fast store error
    #[error("Fast store error: {0}")]
    FastStore(String),

    /// Durable store error
    #[error("Durable store error: {0}")]
    DurableStore(String),

    /// Queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl WorkflowError {
    /// Create a validation error from a list of issues
    pub fn validation(issues: Vec<String>) -> Self {
        WorkflowError::Validation(issues)
    }

    /// Create a workflow-not-found error
    pub fn not_found(workflow_id: Uuid) -> Self {
        WorkflowError::WorkflowNotFound(workflow_id)
    }

    /// Create an unknown-action-type error
    pub fn unknown_action(action_type: impl Into<String>) -> Self {
        WorkflowError::UnknownActionType(action_type.into())
    }

    /// Create an action execution error
    pub fn action(msg: impl Into<String>) -> Self {
        WorkflowError::ActionExecution(msg.into())
    }

    /// Create a fast store error
    pub fn fast_store(msg: impl Into<String>) -> Self {
        WorkflowError::FastStore(msg.into())
    }

    /// Create a durable store error
    pub fn durable_store(msg: impl Into<String>) -> Self {
        WorkflowError::DurableStore(msg.into())
    }

    /// Create a queue error
    pub fn queue(msg: impl Into<String>) -> Self {
        WorkflowError::Queue(msg.into())
    }
}
