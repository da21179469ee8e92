// Time-trigger producer
//
// Scans all time-based workflows once per minute and re-enqueues the ones
// with pending steps. Per-workflow errors are logged and do not abort the
// scan of the remaining workflows. Webhook-triggered workflows are run
// synchronously through the engine, bypassing the queue.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

use flowrun_core::{Result, Trigger, Workflow, WorkflowEngine, WorkflowStore};

/// Cadence of the time-trigger scan
pub const SCAN_INTERVAL: Duration = Duration::from_secs(60);

pub struct TriggerProducer {
    workflows: Arc<dyn WorkflowStore>,
    engine: Arc<WorkflowEngine>,
    interval: Duration,
}

impl TriggerProducer {
    pub fn new(workflows: Arc<dyn WorkflowStore>, engine: Arc<WorkflowEngine>) -> Self {
        Self::with_interval(workflows, engine, SCAN_INTERVAL)
    }

    /// Use a custom scan cadence (shorter intervals for tests)
    pub fn with_interval(
        workflows: Arc<dyn WorkflowStore>,
        engine: Arc<WorkflowEngine>,
        interval: Duration,
    ) -> Self {
        Self {
            workflows,
            engine,
            interval,
        }
    }

    /// Scan on a fixed cadence until the shutdown signal flips.
    /// Takes an Arc so the webhook path can keep using the producer while
    /// the scan loop runs.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Time-trigger producer started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Time-trigger producer shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.scan_time_based().await {
                        error!(error = %err, "Time-based workflow scan failed");
                    }
                }
            }
        }
    }

    /// One scan pass: find all time-based workflows and enqueue those with
    /// pending steps.
    pub async fn scan_time_based(&self) -> Result<()> {
        info!("Checking time-based workflows");
        let workflows = self.workflows.find_all().await?;
        let time_based: Vec<_> = workflows
            .into_iter()
            .filter(|wf| wf.trigger.is_time_based())
            .collect();
        info!(count = time_based.len(), "Found workflows with time-based triggers");

        for workflow in &time_based {
            // Partial failure isolation: one bad workflow must not abort
            // the scan of the rest
            if let Err(err) = self.evaluate(workflow).await {
                error!(workflow_id = %workflow.id, error = %err, "Error processing workflow");
            }
        }
        Ok(())
    }

    async fn evaluate(&self, workflow: &Workflow) -> Result<()> {
        let state = self.engine.get_execution_state(workflow.id).await?;
        let step = state.as_ref().map(|s| s.step).unwrap_or(0);
        let is_completed = state.as_ref().is_some_and(|s| s.is_completed());
        let can_enqueue = !is_completed && (step as usize) < workflow.actions.len();

        let kind = match &workflow.trigger {
            Trigger::TimeBased {
                interval: Some(_), ..
            } => "Recurring",
            _ => "One-time",
        };

        if can_enqueue {
            info!(workflow_id = %workflow.id, kind, "Workflow has pending steps - enqueueing again");
            self.engine.enqueue_workflow(workflow.id).await?;
        } else {
            info!(
                workflow_id = %workflow.id,
                kind,
                "Workflow is completed or has no pending steps. No enqueue"
            );
        }
        Ok(())
    }

    /// Manual path for webhook-triggered workflows: execute synchronously,
    /// bypassing the queue.
    pub async fn trigger_webhook_workflow(&self, workflow_id: Uuid) -> Result<()> {
        info!(%workflow_id, "Triggering webhook for workflow");
        self.engine.execute_workflow(workflow_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flowrun_core::memory::{InMemoryFastStore, InMemoryWorkflowStore, RecordingQueue};
    use flowrun_core::{
        ActionRegistry, ActionSpec, ExecutionState, ExecutionStateStore, ExecutionStatus,
    };
    use serde_json::Map;

    fn workflow(trigger: Trigger, action_count: usize) -> Workflow {
        Workflow {
            id: Uuid::now_v7(),
            name: "Scan Target".to_string(),
            trigger,
            actions: vec![ActionSpec::new("logMessage", Map::new()); action_count],
            last_execution_state: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct Setup {
        producer: TriggerProducer,
        workflows: InMemoryWorkflowStore,
        state_store: ExecutionStateStore,
        queue: RecordingQueue,
    }

    fn setup() -> Setup {
        let workflows = InMemoryWorkflowStore::new();
        let fast = InMemoryFastStore::new();
        let queue = RecordingQueue::new();
        let state_store =
            ExecutionStateStore::new(Arc::new(fast), Arc::new(workflows.clone()));
        let engine = Arc::new(WorkflowEngine::new(
            Arc::new(workflows.clone()),
            state_store.clone(),
            Arc::new(ActionRegistry::with_defaults()),
            Arc::new(queue.clone()),
        ));
        let producer = TriggerProducer::new(Arc::new(workflows.clone()), engine);
        Setup {
            producer,
            workflows,
            state_store,
            queue,
        }
    }

    #[tokio::test]
    async fn enqueues_pending_and_skips_completed() {
        let s = setup();

        let pending = workflow(
            Trigger::TimeBased {
                interval: Some("daily".to_string()),
            },
            1,
        );
        let done = workflow(
            Trigger::TimeBased {
                interval: Some("daily".to_string()),
            },
            1,
        );
        let pending_id = pending.id;
        let done_id = done.id;
        s.workflows.add(pending).await;
        s.workflows.add(done).await;

        s.state_store
            .update(pending_id, &ExecutionState::at_step(0))
            .await
            .unwrap();
        s.state_store
            .update(
                done_id,
                &ExecutionState {
                    step: 1,
                    status: Some(ExecutionStatus::Completed),
                    error: None,
                },
            )
            .await
            .unwrap();

        s.producer.scan_time_based().await.unwrap();

        assert_eq!(s.queue.enqueued().await, vec![pending_id]);
    }

    #[tokio::test]
    async fn absent_state_counts_as_step_zero() {
        let s = setup();
        let wf = workflow(Trigger::TimeBased { interval: None }, 2);
        let id = wf.id;
        s.workflows.add(wf).await;

        s.producer.scan_time_based().await.unwrap();

        assert_eq!(s.queue.enqueued().await, vec![id]);
    }

    #[tokio::test]
    async fn webhook_workflows_are_not_scanned() {
        let s = setup();
        let wf = workflow(Trigger::Webhook {}, 1);
        s.workflows.add(wf).await;

        s.producer.scan_time_based().await.unwrap();

        assert!(s.queue.enqueued().await.is_empty());
    }

    #[tokio::test]
    async fn cursor_at_end_is_not_reenqueued_even_without_completed_status() {
        let s = setup();
        let wf = workflow(
            Trigger::TimeBased {
                interval: Some("monthly".to_string()),
            },
            1,
        );
        let id = wf.id;
        s.workflows.add(wf).await;
        s.state_store
            .update(id, &ExecutionState::at_step(1))
            .await
            .unwrap();

        s.producer.scan_time_based().await.unwrap();

        assert!(s.queue.enqueued().await.is_empty());
    }

    #[tokio::test]
    async fn webhook_trigger_executes_synchronously() {
        let s = setup();
        let params: Map<String, serde_json::Value> = serde_json::from_value(
            serde_json::json!({"message": "Webhook triggered"}),
        )
        .unwrap();
        let wf = Workflow {
            actions: vec![ActionSpec::new("logMessage", params)],
            ..workflow(Trigger::Webhook {}, 0)
        };
        let id = wf.id;
        s.workflows.add(wf).await;

        s.producer.trigger_webhook_workflow(id).await.unwrap();

        // Ran through the engine directly: cursor advanced, queue untouched
        let state = s.state_store.get(id).await.unwrap().unwrap();
        assert_eq!(state.step, 1);
        assert!(s.queue.enqueued().await.is_empty());
    }
}
