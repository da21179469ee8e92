// In-memory implementations for examples and testing
//
// These implementations keep all data in memory, making them useful for:
// - Unit and integration tests without Postgres or a broker
// - Quick prototyping
//
// InMemoryFastStore honors TTLs (expired entries read as absent), so the
// one-hour forgetting behavior of the execution state store is observable
// in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::state::ExecutionState;
use crate::traits::{ExecutionQueue, FastStore, WorkflowStore};
use crate::workflow::Workflow;

// ============================================================================
// InMemoryFastStore - expiring key-value store
// ============================================================================

/// In-memory expiring key-value store.
///
/// Entries are checked lazily on read; an expired entry reads as absent.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFastStore {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl InMemoryFastStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Force an entry to expire immediately (useful for testing the
    /// state-forgetting behavior)
    pub async fn expire(&self, key: &str) {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.1 = Instant::now();
        }
    }

    /// Clear all entries
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl FastStore for InMemoryFastStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|(value, deadline)| {
            if Instant::now() < *deadline {
                Some(value.clone())
            } else {
                None
            }
        }))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }
}

// ============================================================================
// InMemoryWorkflowStore - durable store stand-in
// ============================================================================

/// In-memory workflow store keyed by workflow ID.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorkflowStore {
    workflows: Arc<RwLock<HashMap<Uuid, Workflow>>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self {
            workflows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add a workflow to the store
    pub async fn add(&self, workflow: Workflow) {
        self.workflows.write().await.insert(workflow.id, workflow);
    }

    /// Read back a stored workflow (to inspect the denormalized state)
    pub async fn get(&self, workflow_id: Uuid) -> Option<Workflow> {
        self.workflows.read().await.get(&workflow_id).cloned()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn find_by_id(&self, workflow_id: Uuid) -> Result<Option<Workflow>> {
        Ok(self.workflows.read().await.get(&workflow_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Workflow>> {
        Ok(self.workflows.read().await.values().cloned().collect())
    }

    async fn update_last_execution_state(
        &self,
        workflow_id: Uuid,
        state: &ExecutionState,
    ) -> Result<()> {
        if let Some(workflow) = self.workflows.write().await.get_mut(&workflow_id) {
            workflow.last_execution_state = Some(state.clone());
        }
        Ok(())
    }
}

// ============================================================================
// RecordingQueue - records enqueued workflow IDs
// ============================================================================

/// Queue stand-in that records enqueued workflow IDs instead of delivering
/// them. Lets tests assert exactly which workflows were (re-)enqueued.
#[derive(Debug, Default, Clone)]
pub struct RecordingQueue {
    enqueued: Arc<RwLock<Vec<Uuid>>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self {
            enqueued: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Workflow IDs enqueued so far, in order
    pub async fn enqueued(&self) -> Vec<Uuid> {
        self.enqueued.read().await.clone()
    }
}

#[async_trait]
impl ExecutionQueue for RecordingQueue {
    async fn enqueue(&self, workflow_id: Uuid) -> Result<()> {
        self.enqueued.write().await.push(workflow_id);
        Ok(())
    }
}
