// Workflow execution engine - the step state machine
//
// One executeWorkflow call executes at most one action and advances the
// cursor by at most one step; driving a workflow to completion takes
// repeated external invocations, normally queue re-deliveries from the
// time-trigger producer. The engine never loops internally over steps.
//
// Error asymmetry (load-bearing, preserved from the original system):
// - A missing workflow definition is a fault: execute_workflow returns
//   Err, the queue worker re-raises it, and the broker's delivery retry
//   applies.
// - An action failure (including an unknown action type) is terminal for
//   the delivery: the engine records {status: failed, error} and returns
//   Ok, so the broker does NOT retry it. Only a later external re-enqueue
//   (e.g. the next producer tick) resumes the workflow.
//
// Concurrency: no per-workflow locking. Two concurrent executions for the
// same id can both read step=i, both run action i, and both write i+1 -
// a read-then-blind-overwrite discipline, kept as designed.

use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::actions::{ActionContext, ActionRegistry};
use crate::error::{Result, WorkflowError};
use crate::state::ExecutionState;
use crate::state_store::ExecutionStateStore;
use crate::traits::{ExecutionQueue, WorkflowStore};
use crate::workflow::{ActionSpec, Workflow};

/// Hard safety cap on the step cursor, independent of sequence length
pub const MAX_STEPS: u32 = 5;

/// The workflow execution engine.
///
/// Owns the step state machine: decides the next action, invokes the
/// dispatcher, advances or completes the cursor, records failures.
pub struct WorkflowEngine {
    workflows: Arc<dyn WorkflowStore>,
    state_store: ExecutionStateStore,
    registry: Arc<ActionRegistry>,
    queue: Arc<dyn ExecutionQueue>,
}

impl WorkflowEngine {
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        state_store: ExecutionStateStore,
        registry: Arc<ActionRegistry>,
        queue: Arc<dyn ExecutionQueue>,
    ) -> Self {
        Self {
            workflows,
            state_store,
            registry,
            queue,
        }
    }

    /// Submit an execution request to the queue broker (manual trigger
    /// path). Retry/backoff is entirely the broker's concern.
    pub async fn enqueue_workflow(&self, workflow_id: Uuid) -> Result<()> {
        info!(%workflow_id, "Adding workflow to queue");
        self.queue.enqueue(workflow_id).await
    }

    /// Read the live execution state (fast store only; absent after the
    /// TTL even though the durable row retains the last copy).
    pub async fn get_execution_state(&self, workflow_id: Uuid) -> Result<Option<ExecutionState>> {
        self.state_store.get(workflow_id).await
    }

    /// Execute at most one step of the given workflow.
    ///
    /// Returns Err only when the workflow definition cannot be loaded;
    /// action failures are recorded in the execution state and swallowed.
    pub async fn execute_workflow(&self, workflow_id: Uuid) -> Result<()> {
        info!(%workflow_id, "Executing workflow");

        let workflow = self.fetch_workflow(workflow_id).await?;
        let current = self
            .state_store
            .get(workflow_id)
            .await?
            .unwrap_or_default();

        info!(%workflow_id, step = current.step, "Executing step");

        if workflow.actions.is_empty() {
            warn!(%workflow_id, "No actions defined for workflow");
            return self.complete_workflow(workflow_id).await;
        }

        if current.step as usize >= workflow.actions.len() {
            info!(%workflow_id, "No more actions to execute for workflow");
            return self.complete_workflow(workflow_id).await;
        }

        if current.step >= MAX_STEPS {
            info!(
                %workflow_id,
                max_steps = MAX_STEPS,
                "Workflow reached the maximum step limit. Completing"
            );
            return self.complete_workflow(workflow_id).await;
        }

        let action = &workflow.actions[current.step as usize];
        match self.execute_action(action, workflow_id, current.step).await {
            Ok(()) => {
                // Full-state overwrite: a prior failure's status/error are
                // dropped naturally on the next successful step
                self.state_store
                    .update(workflow_id, &ExecutionState::at_step(current.step + 1))
                    .await
            }
            Err(err) => {
                // Step is NOT advanced; a re-enqueue retries the same index
                error!(%workflow_id, error = %err, "Error while processing workflow");
                self.state_store
                    .update(workflow_id, &ExecutionState::failed(err.to_string()))
                    .await
            }
        }
    }

    async fn fetch_workflow(&self, workflow_id: Uuid) -> Result<Workflow> {
        match self.workflows.find_by_id(workflow_id).await? {
            Some(workflow) => Ok(workflow),
            None => {
                warn!(%workflow_id, "Workflow not found");
                Err(WorkflowError::not_found(workflow_id))
            }
        }
    }

    async fn complete_workflow(&self, workflow_id: Uuid) -> Result<()> {
        info!(%workflow_id, "Completing workflow");
        self.state_store
            .update(workflow_id, &ExecutionState::completed())
            .await
    }

    async fn execute_action(
        &self,
        action: &ActionSpec,
        workflow_id: Uuid,
        step: u32,
    ) -> Result<()> {
        info!(action_type = %action.action_type, "Executing action");
        let instance = self.registry.resolve(&action.action_type)?;
        let result = instance
            .execute(&ActionContext {
                workflow_id,
                step,
                params: action.params.clone(),
            })
            .await;

        if result.success {
            Ok(())
        } else {
            Err(WorkflowError::action(result.error.unwrap_or_else(|| {
                "Unknown error occurred in action execution".to_string()
            })))
        }
    }
}
