// Repository layer for database operations
//
// The workflows table holds the definition plus a denormalized
// last_execution_state jsonb column. The engine writes only that column
// (through the WorkflowStore trait); all other fields belong to the CRUD
// layer.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use flowrun_core::{ExecutionState, Workflow, WorkflowError, WorkflowStore};

use crate::models::{CreateWorkflow, UpdateWorkflow, WorkflowRow};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Workflows
    // ============================================

    pub async fn create_workflow(&self, input: CreateWorkflow) -> Result<WorkflowRow> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            INSERT INTO workflows (id, name, "trigger", actions)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, "trigger", actions, last_execution_state, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(Json(&input.trigger))
        .bind(Json(&input.actions))
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_workflow(&self, id: Uuid) -> Result<Option<WorkflowRow>> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT id, name, "trigger", actions, last_execution_state, created_at, updated_at
            FROM workflows
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_workflows(&self) -> Result<Vec<WorkflowRow>> {
        let rows = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT id, name, "trigger", actions, last_execution_state, created_at, updated_at
            FROM workflows
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_workflow(&self, id: Uuid, input: UpdateWorkflow) -> Result<Option<WorkflowRow>> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            UPDATE workflows
            SET
                name = COALESCE($2, name),
                "trigger" = COALESCE($3, "trigger"),
                actions = COALESCE($4, actions),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, "trigger", actions, last_execution_state, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.trigger.as_ref().map(Json))
        .bind(input.actions.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_workflow(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_last_execution_state(&self, id: Uuid, state: &ExecutionState) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE workflows
            SET last_execution_state = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(state))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================
// WorkflowStore trait (engine-facing view)
// ============================================

#[async_trait]
impl WorkflowStore for Database {
    async fn find_by_id(&self, workflow_id: Uuid) -> flowrun_core::Result<Option<Workflow>> {
        let row = self
            .get_workflow(workflow_id)
            .await
            .map_err(|e| WorkflowError::durable_store(e.to_string()))?;
        Ok(row.map(Workflow::from))
    }

    async fn find_all(&self) -> flowrun_core::Result<Vec<Workflow>> {
        let rows = self
            .list_workflows()
            .await
            .map_err(|e| WorkflowError::durable_store(e.to_string()))?;
        Ok(rows.into_iter().map(Workflow::from).collect())
    }

    async fn update_last_execution_state(
        &self,
        workflow_id: Uuid,
        state: &ExecutionState,
    ) -> flowrun_core::Result<()> {
        self.set_last_execution_state(workflow_id, state)
            .await
            .map_err(|e| WorkflowError::durable_store(e.to_string()))
    }
}
