// logMessage action - writes a configured message to the log stream

use async_trait::async_trait;
use tracing::info;

use super::{Action, ActionContext, ActionResult};

pub struct LogMessageAction;

#[async_trait]
impl Action for LogMessageAction {
    fn action_type(&self) -> &str {
        "logMessage"
    }

    async fn execute(&self, context: &ActionContext) -> ActionResult {
        let message = context.params.get("message").and_then(|v| v.as_str());

        let Some(message) = message else {
            return ActionResult::fail("Message parameter is required");
        };

        info!(
            workflow_id = %context.workflow_id,
            step = context.step,
            "Log Message Action: {message}"
        );
        ActionResult::ok()
    }
}
