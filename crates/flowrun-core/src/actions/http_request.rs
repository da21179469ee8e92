// httpRequest action - performs an HTTP call against a configured URL
//
// Fails fast if the url or method param is missing; otherwise success or
// failure follows the transport outcome. The optional body param is sent
// as JSON. Timeouts are whatever the underlying client enforces; the
// engine adds none of its own.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use super::{Action, ActionContext, ActionResult};

pub struct HttpRequestAction {
    client: reqwest::Client,
}

impl HttpRequestAction {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a pre-configured client (shared connection pool, test setups)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpRequestAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for HttpRequestAction {
    fn action_type(&self) -> &str {
        "httpRequest"
    }

    async fn execute(&self, context: &ActionContext) -> ActionResult {
        let url = context.params.get("url").and_then(|v| v.as_str());
        let method = context.params.get("method").and_then(|v| v.as_str());

        let (url, method) = match (url, method) {
            (Some(url), Some(method)) => (url, method),
            _ => return ActionResult::fail("URL and method parameters are required"),
        };

        let method = match Method::from_bytes(method.to_uppercase().as_bytes()) {
            Ok(m) => m,
            Err(_) => return ActionResult::fail(format!("Unsupported HTTP method: {method}")),
        };

        debug!(
            workflow_id = %context.workflow_id,
            step = context.step,
            %method,
            url,
            "Performing HTTP request"
        );

        let mut request = self.client.request(method, url);
        if let Some(body) = context.params.get("body") {
            request = request.json(body);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    ActionResult::ok_with(json!({
                        "status": status.as_u16(),
                        "body": body,
                    }))
                } else {
                    ActionResult::fail(format!("HTTP request failed with status {status}"))
                }
            }
            Err(err) => ActionResult::fail(format!("HTTP request failed: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(params: Value) -> ActionContext {
        let params: Map<String, Value> = serde_json::from_value(params).unwrap();
        ActionContext {
            workflow_id: Uuid::now_v7(),
            step: 0,
            params,
        }
    }

    #[tokio::test]
    async fn missing_url_or_method_fails_fast() {
        let action = HttpRequestAction::new();

        let result = action
            .execute(&context(serde_json::json!({"method": "GET"})))
            .await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("URL and method parameters are required")
        );

        let result = action
            .execute(&context(serde_json::json!({"url": "https://x"})))
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn successful_call_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let action = HttpRequestAction::new();
        let result = action
            .execute(&context(serde_json::json!({
                "url": format!("{}/report", server.uri()),
                "method": "GET"
            })))
            .await;

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["status"], 200);
        assert_eq!(data["body"], "ok");
    }

    #[tokio::test]
    async fn server_error_is_an_expected_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cleanup"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let action = HttpRequestAction::new();
        let result = action
            .execute(&context(serde_json::json!({
                "url": format!("{}/cleanup", server.uri()),
                "method": "POST",
                "body": {"dry_run": true}
            })))
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("500"));
    }
}
