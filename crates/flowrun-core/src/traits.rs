// Core traits for pluggable backends
//
// These traits let the execution engine run against different backends:
// - In-memory implementations for examples and testing
// - Postgres (flowrun-storage) and an in-process queue (flowrun-worker)
//   for production wiring
//
// The fast store and the queue broker are external collaborators in the
// original design (Redis and a Bull queue); here they are traits so the
// engine stays agnostic of the concrete backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::state::ExecutionState;
use crate::workflow::Workflow;

// ============================================================================
// WorkflowStore - durable workflow definitions
// ============================================================================

/// Trait for the durable store that owns workflow definitions.
///
/// The engine only ever writes the denormalized `last_execution_state`
/// field through this trait; definition fields are managed by the CRUD
/// layer.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Load a workflow definition by id
    async fn find_by_id(&self, workflow_id: Uuid) -> Result<Option<Workflow>>;

    /// Load all workflow definitions
    async fn find_all(&self) -> Result<Vec<Workflow>>;

    /// Overwrite the denormalized last-known execution state
    async fn update_last_execution_state(
        &self,
        workflow_id: Uuid,
        state: &ExecutionState,
    ) -> Result<()>;
}

// ============================================================================
// FastStore - expiring key-value store for live execution state
// ============================================================================

/// Trait for the low-latency expiring key-value store.
///
/// A missing or expired key is `Ok(None)`, never an error.
#[async_trait]
pub trait FastStore: Send + Sync {
    /// Read a value; expired entries read as absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value with a time-to-live in seconds
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
}

// ============================================================================
// ExecutionQueue - broker-backed execution requests
// ============================================================================

/// Trait for submitting execution requests to the queue broker.
///
/// The broker owns all retry/backoff mechanics (at-least-once delivery);
/// the engine never implements its own retry loop.
#[async_trait]
pub trait ExecutionQueue: Send + Sync {
    /// Submit an execution request for the given workflow
    async fn enqueue(&self, workflow_id: Uuid) -> Result<()>;
}
