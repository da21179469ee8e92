// Services layer for business logic
// Services own validation and row/domain mapping, calling storage directly

pub mod workflow;

pub use workflow::WorkflowService;
