// In-process execution queue with broker-style delivery retry
//
// The queue owns all retry/backoff mechanics; the engine never retries
// internally. Per delivery the worker invokes execute_workflow exactly
// once and re-raises faults, so a fault (e.g. workflow not found) burns
// one of the job's attempts and is re-delivered after an exponential
// backoff. An action failure returns Ok from the engine and therefore
// consumes the whole job without any queue-level retry - that asymmetry
// is the contract, not an accident.
//
// Policy mirrors the broker options of the original system: 5 attempts,
// exponential backoff starting at 5s, completed jobs dropped, exhausted
// jobs retained for inspection.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use flowrun_core::{ExecutionQueue, WorkflowEngine, WorkflowError};

/// Job name tag carried by every execution request
pub const JOB_NAME: &str = "execute-workflow";

/// One execution request on the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job name (always "execute-workflow")
    pub name: String,
    #[serde(rename = "workflowId")]
    pub workflow_id: Uuid,
    /// 1-based delivery attempt
    #[serde(skip)]
    pub attempt: u32,
}

impl Job {
    fn first_attempt(workflow_id: Uuid) -> Self {
        Self {
            name: JOB_NAME.to_string(),
            workflow_id,
            attempt: 1,
        }
    }
}

/// Delivery retry policy
#[derive(Debug, Clone)]
pub struct QueuePolicy {
    /// Total delivery attempts per job
    pub attempts: u32,
    /// First retry delay; doubles on each subsequent retry
    pub backoff_base: Duration,
    /// Drop jobs from the queue once processed successfully
    pub remove_on_complete: bool,
    /// Keep exhausted jobs for inspection
    pub remove_on_fail: bool,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff_base: Duration::from_millis(5000),
            remove_on_complete: true,
            remove_on_fail: false,
        }
    }
}

impl QueuePolicy {
    /// Backoff before re-delivering a job whose given 1-based attempt
    /// failed: base * 2^(attempt - 1)
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// A job that exhausted its delivery attempts
#[derive(Debug, Clone)]
pub struct FailedJob {
    pub job: Job,
    pub error: String,
}

/// Shared view of retained exhausted jobs
#[derive(Debug, Default, Clone)]
pub struct FailedJobs {
    jobs: Arc<RwLock<Vec<FailedJob>>>,
}

impl FailedJobs {
    pub async fn all(&self) -> Vec<FailedJob> {
        self.jobs.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    async fn push(&self, failed: FailedJob) {
        self.jobs.write().await.push(failed);
    }
}

/// Sender half of the queue. Cheap to clone; implements the core
/// `ExecutionQueue` trait consumed by the engine and the producer.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiver half, consumed by the queue worker
pub struct JobReceiver {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl JobQueue {
    /// Create a queue and the receiver its worker will drain
    pub fn new() -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, JobReceiver { rx })
    }

    fn submit(&self, job: Job) -> flowrun_core::Result<()> {
        self.tx
            .send(job)
            .map_err(|_| WorkflowError::queue("queue receiver dropped"))
    }
}

#[async_trait::async_trait]
impl ExecutionQueue for JobQueue {
    async fn enqueue(&self, workflow_id: Uuid) -> flowrun_core::Result<()> {
        info!(%workflow_id, job = JOB_NAME, "Enqueueing execution request");
        self.submit(Job::first_attempt(workflow_id))
    }
}

/// Worker draining the queue: one engine invocation per delivered job.
pub struct QueueWorker {
    engine: Arc<WorkflowEngine>,
    queue: JobQueue,
    receiver: JobReceiver,
    policy: QueuePolicy,
    failed: FailedJobs,
}

impl QueueWorker {
    pub fn new(engine: Arc<WorkflowEngine>, queue: JobQueue, receiver: JobReceiver) -> Self {
        Self::with_policy(engine, queue, receiver, QueuePolicy::default())
    }

    pub fn with_policy(
        engine: Arc<WorkflowEngine>,
        queue: JobQueue,
        receiver: JobReceiver,
        policy: QueuePolicy,
    ) -> Self {
        Self {
            engine,
            queue,
            receiver,
            policy,
            failed: FailedJobs::default(),
        }
    }

    /// Handle to the retained exhausted jobs; grab a clone before `run`
    pub fn failed_jobs(&self) -> FailedJobs {
        self.failed.clone()
    }

    /// Drain the queue until the shutdown signal flips
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Queue worker started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Queue worker shutting down");
                    break;
                }
                job = self.receiver.rx.recv() => {
                    match job {
                        Some(job) => self.process(job).await,
                        None => {
                            info!("Queue closed, worker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn process(&self, job: Job) {
        match self.engine.execute_workflow(job.workflow_id).await {
            Ok(()) => {
                // remove_on_complete: nothing retained
                info!(workflow_id = %job.workflow_id, "Workflow processed successfully");
            }
            Err(err) => {
                error!(
                    workflow_id = %job.workflow_id,
                    attempt = job.attempt,
                    error = %err,
                    "Error processing workflow"
                );
                self.redeliver_or_retain(job, err).await;
            }
        }
    }

    async fn redeliver_or_retain(&self, job: Job, err: WorkflowError) {
        if job.attempt < self.policy.attempts {
            let delay = self.policy.backoff_for(job.attempt);
            let next = Job {
                attempt: job.attempt + 1,
                ..job
            };
            let queue = self.queue.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if queue.submit(next).is_err() {
                    warn!("Queue closed before re-delivery");
                }
            });
        } else if !self.policy.remove_on_fail {
            warn!(
                workflow_id = %job.workflow_id,
                attempts = job.attempt,
                "Job exhausted its delivery attempts, retaining for inspection"
            );
            self.failed
                .push(FailedJob {
                    job,
                    error: err.to_string(),
                })
                .await;
        }
    }
}
