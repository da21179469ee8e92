// Workflow Execution Core
//
// This crate provides a DB-agnostic implementation of a linear workflow
// execution engine: a named sequence of actions triggered on a schedule or
// by a webhook, executed one step per invocation with a persistent cursor.
//
// Key design decisions:
// - Uses traits (WorkflowStore, FastStore, ExecutionQueue) for pluggable
//   backends; in-memory implementations live in `memory` for testing
// - Actions are defined via the Action trait and resolved through an
//   ActionRegistry populated at process start - the engine never branches
//   on action type
// - Execution state is dual-written: fast store with a 1h TTL first, then
//   the durable row's denormalized copy, with no transaction between them
// - Action failures are recorded in the execution state and swallowed;
//   only definition-lookup faults propagate to the queue worker

pub mod actions;
pub mod engine;
pub mod error;
pub mod state;
pub mod state_store;
pub mod traits;
pub mod workflow;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use actions::{
    Action, ActionContext, ActionRegistry, ActionRegistryBuilder, ActionResult, HttpRequestAction,
    LogMessageAction,
};
pub use engine::{WorkflowEngine, MAX_STEPS};
pub use error::{Result, WorkflowError};
pub use state::{ExecutionState, ExecutionStatus};
pub use state_store::{ExecutionStateStore, STATE_TTL_SECS};
pub use traits::{ExecutionQueue, FastStore, WorkflowStore};
pub use workflow::{validate_definition, ActionSpec, Trigger, Workflow};
