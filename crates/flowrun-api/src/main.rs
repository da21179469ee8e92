// Flowrun API server
//
// Single-process deployment: the HTTP surface, the queue worker, and the
// time-trigger producer all run here, wired with explicit constructors.
// Shutdown is a shared watch channel flipped on ctrl-c.

mod common;
mod services;
mod workflows;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use flowrun_core::memory::InMemoryFastStore;
use flowrun_core::{ActionRegistry, ExecutionStateStore, WorkflowEngine};
use flowrun_storage::Database;
use flowrun_worker::{JobQueue, QueueWorker, TriggerProducer};

use crate::services::WorkflowService;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        workflows::create_workflow,
        workflows::list_workflows,
        workflows::get_workflow,
        workflows::update_workflow,
        workflows::delete_workflow,
        workflows::trigger_workflow,
        workflows::webhook_workflow,
        workflows::get_workflow_state,
    ),
    components(
        schemas(
            flowrun_core::Workflow,
            flowrun_core::Trigger,
            flowrun_core::ActionSpec,
            flowrun_core::ExecutionState,
            flowrun_core::ExecutionStatus,
            workflows::CreateWorkflowRequest,
            workflows::UpdateWorkflowRequest,
            common::ListResponse<flowrun_core::Workflow>,
            common::ErrorResponse,
        )
    ),
    tags(
        (name = "workflows", description = "Workflow management and trigger endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowrun_api=debug,flowrun_core=debug,flowrun_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("flowrun-api starting...");

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    let db = Arc::new(db);

    // Fast store for live execution state (1h TTL handled by the store).
    // Swapping in a Redis-backed FastStore is a wiring change only.
    let fast = Arc::new(InMemoryFastStore::new());

    let (queue, receiver) = JobQueue::new();
    let state_store = ExecutionStateStore::new(fast, db.clone());
    let engine = Arc::new(WorkflowEngine::new(
        db.clone(),
        state_store,
        Arc::new(ActionRegistry::with_defaults()),
        Arc::new(queue.clone()),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = QueueWorker::new(engine.clone(), queue, receiver);
    tokio::spawn(worker.run(shutdown_rx.clone()));

    let producer = Arc::new(TriggerProducer::new(db.clone(), engine.clone()));
    tokio::spawn(producer.clone().run(shutdown_rx));

    let state = workflows::AppState {
        service: Arc::new(WorkflowService::new(db)),
        engine,
        producer,
    };

    let app = Router::new()
        .route("/health", get(health))
        .merge(workflows::routes(state))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("Server error")?;

    tracing::info!("flowrun-api shutdown complete");
    Ok(())
}
