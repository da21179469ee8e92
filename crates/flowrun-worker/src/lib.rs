// Flowrun worker: queue consumption and time-based trigger production
//
// Two long-running tasks, both shut down via a shared watch channel:
// - QueueWorker drains the execution queue, invoking the engine exactly
//   once per delivered job and applying the broker retry policy to faults
// - TriggerProducer re-evaluates time-based workflows once per minute and
//   re-enqueues the ones with pending steps

pub mod producer;
pub mod queue;

pub use producer::{TriggerProducer, SCAN_INTERVAL};
pub use queue::{FailedJob, FailedJobs, Job, JobQueue, JobReceiver, QueuePolicy, QueueWorker, JOB_NAME};
