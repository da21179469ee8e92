// Dual-backed execution state store
//
// Live execution state lives in the fast store under a one-hour TTL; every
// update also overwrites the durable workflow row's denormalized
// last_execution_state field, in that order. Reads consult the fast store
// only: once the fast entry has expired, get() reports absent even though
// the durable row still carries the last state, and the engine restarts
// the workflow from step 0. That asymmetry matches the original system
// and is kept deliberately.
//
// There is no transaction across the two writes. A crash between them
// leaves the replicas inconsistent; accepted risk, not masked here.

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::state::ExecutionState;
use crate::traits::{FastStore, WorkflowStore};

/// TTL for live execution state in the fast store (1 hour)
pub const STATE_TTL_SECS: u64 = 3600;

/// Store for live per-workflow execution state.
///
/// The execution engine is the sole writer.
#[derive(Clone)]
pub struct ExecutionStateStore {
    fast: Arc<dyn FastStore>,
    durable: Arc<dyn WorkflowStore>,
}

impl ExecutionStateStore {
    pub fn new(fast: Arc<dyn FastStore>, durable: Arc<dyn WorkflowStore>) -> Self {
        Self { fast, durable }
    }

    fn key(workflow_id: Uuid) -> String {
        format!("workflow:{workflow_id}:state")
    }

    /// Read the live execution state. A fast-store miss (including an
    /// expired entry) is `Ok(None)`, never an error.
    pub async fn get(&self, workflow_id: Uuid) -> Result<Option<ExecutionState>> {
        debug!(%workflow_id, "Fetching execution state");
        let raw = self.fast.get(&Self::key(workflow_id)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the execution state with the full replacement value:
    /// fast store first (with TTL), then the durable denormalized copy.
    pub async fn update(&self, workflow_id: Uuid, state: &ExecutionState) -> Result<()> {
        debug!(%workflow_id, ?state, "Updating execution state");
        let serialized = serde_json::to_string(state)?;
        self.fast
            .set(&Self::key(workflow_id), &serialized, STATE_TTL_SECS)
            .await?;
        self.durable
            .update_last_execution_state(workflow_id, state)
            .await?;
        Ok(())
    }
}
