// Workflow CRUD and trigger HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use flowrun_core::{ActionSpec, ExecutionState, Trigger, Workflow, WorkflowEngine, WorkflowError};
use flowrun_worker::TriggerProducer;

use crate::common::{ApiError, ListResponse};
use crate::services::WorkflowService;

/// App state for workflow routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WorkflowService>,
    pub engine: Arc<WorkflowEngine>,
    pub producer: Arc<TriggerProducer>,
}

/// Create workflow routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/workflows", post(create_workflow).get(list_workflows))
        .route(
            "/v1/workflows/:workflow_id",
            get(get_workflow).put(update_workflow).delete(delete_workflow),
        )
        .route("/v1/workflows/:workflow_id/trigger", post(trigger_workflow))
        .route("/v1/workflows/:workflow_id/webhook", post(webhook_workflow))
        .route("/v1/workflows/:workflow_id/state", get(get_workflow_state))
        .with_state(state)
}

/// Request to create a workflow
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWorkflowRequest {
    pub name: String,
    pub trigger: Trigger,
    /// Ordered action list; omitted means an empty workflow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSpec>>,
}

/// Request to update a workflow; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateWorkflowRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSpec>>,
}

/// POST /v1/workflows - Create a new workflow
#[utoipa::path(
    post,
    path = "/v1/workflows",
    request_body = CreateWorkflowRequest,
    responses(
        (status = 201, description = "Workflow created successfully", body = Workflow),
        (status = 400, description = "Invalid input data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(req): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let workflow = state.service.create(req).await?;
    Ok((StatusCode::CREATED, Json(workflow)))
}

/// GET /v1/workflows - List all workflows
#[utoipa::path(
    get,
    path = "/v1/workflows",
    responses(
        (status = 200, description = "List of workflows", body = ListResponse<Workflow>),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn list_workflows(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Workflow>>, ApiError> {
    let workflows = state.service.list().await?;
    Ok(Json(ListResponse::new(workflows)))
}

/// GET /v1/workflows/{workflow_id} - Get workflow by ID
#[utoipa::path(
    get,
    path = "/v1/workflows/{workflow_id}",
    params(("workflow_id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow found", body = Workflow),
        (status = 404, description = "Workflow not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = state
        .service
        .get(workflow_id)
        .await?
        .ok_or(WorkflowError::WorkflowNotFound(workflow_id))?;
    Ok(Json(workflow))
}

/// PUT /v1/workflows/{workflow_id} - Update an existing workflow
#[utoipa::path(
    put,
    path = "/v1/workflows/{workflow_id}",
    params(("workflow_id" = Uuid, Path, description = "Workflow ID")),
    request_body = UpdateWorkflowRequest,
    responses(
        (status = 200, description = "Workflow updated successfully", body = Workflow),
        (status = 400, description = "Invalid input data"),
        (status = 404, description = "Workflow not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn update_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
    Json(req): Json<UpdateWorkflowRequest>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = state.service.update(workflow_id, req).await?;
    Ok(Json(workflow))
}

/// DELETE /v1/workflows/{workflow_id} - Delete a workflow
#[utoipa::path(
    delete,
    path = "/v1/workflows/{workflow_id}",
    params(("workflow_id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 204, description = "Workflow deleted successfully"),
        (status = 404, description = "Workflow not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.service.delete(workflow_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WorkflowError::WorkflowNotFound(workflow_id).into())
    }
}

/// POST /v1/workflows/{workflow_id}/trigger - Manually enqueue a workflow
#[utoipa::path(
    post,
    path = "/v1/workflows/{workflow_id}/trigger",
    params(("workflow_id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 202, description = "Workflow enqueued for execution"),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn trigger_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.engine.enqueue_workflow(workflow_id).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /v1/workflows/{workflow_id}/webhook - Run a webhook-triggered
/// workflow synchronously, bypassing the queue
#[utoipa::path(
    post,
    path = "/v1/workflows/{workflow_id}/webhook",
    params(("workflow_id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow executed"),
        (status = 404, description = "Workflow not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn webhook_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.producer.trigger_webhook_workflow(workflow_id).await?;
    Ok(StatusCode::OK)
}

/// GET /v1/workflows/{workflow_id}/state - Current execution state
///
/// Returns null once the fast-store entry has expired, even though the
/// workflow row still carries the last denormalized copy.
#[utoipa::path(
    get,
    path = "/v1/workflows/{workflow_id}/state",
    params(("workflow_id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Current execution state, or null if absent", body = Option<ExecutionState>),
        (status = 500, description = "Internal server error")
    ),
    tag = "workflows"
)]
pub async fn get_workflow_state(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> Result<Json<Option<ExecutionState>>, ApiError> {
    let execution_state = state.engine.get_execution_state(workflow_id).await?;
    Ok(Json(execution_state))
}
