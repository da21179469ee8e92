// Postgres persistence for Flowrun
//
// Workflow definitions live in a single `workflows` table with jsonb
// columns for the trigger, the action list, and the denormalized
// last-known execution state. The `Database` repository implements the
// core `WorkflowStore` trait so the engine stays storage-agnostic.

pub mod models;
pub mod repositories;

pub use models::{CreateWorkflow, UpdateWorkflow, WorkflowRow};
pub use repositories::Database;
