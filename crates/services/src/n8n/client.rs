// n8n public API (v1) client

use super::types::{Credential, Execution, ListResponse, Workflow};
use crate::error::UpstreamError;
use mcp_base_core::{keys, ServiceConfig, ToolParams};
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use std::time::Duration;

const SERVICE: &str = "n8n";

/// Authenticated n8n client, built per call from the configuration object
#[derive(Debug, Clone)]
pub struct N8nClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl N8nClient {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, UpstreamError> {
        let base_url = config.require(keys::N8N_API_URL)?;
        let api_key = config.require(keys::N8N_API_KEY)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(UpstreamError::http(SERVICE))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v1{}", self.base_url, endpoint)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, UpstreamError> {
        let url = self.url(endpoint);
        tracing::debug!(method = %method, url = %url, "n8n request");

        let mut request = self
            .client
            .request(method, url)
            .query(query)
            .header("X-N8N-API-KEY", &self.api_key)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(UpstreamError::http(SERVICE))?;
        if !response.status().is_success() {
            return Err(UpstreamError::from_response(SERVICE, response).await);
        }

        response.json().await.map_err(UpstreamError::http(SERVICE))
    }

    pub async fn list_workflows(&self, limit: u64) -> Result<ListResponse<Workflow>, UpstreamError> {
        self.request(Method::GET, "/workflows", &[("limit", limit.to_string())], None)
            .await
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Workflow, UpstreamError> {
        self.request(Method::GET, &format!("/workflows/{}", id), &[], None)
            .await
    }

    pub async fn activate_workflow(&self, id: &str) -> Result<Workflow, UpstreamError> {
        self.request(Method::POST, &format!("/workflows/{}/activate", id), &[], None)
            .await
    }

    pub async fn deactivate_workflow(&self, id: &str) -> Result<Workflow, UpstreamError> {
        self.request(Method::POST, &format!("/workflows/{}/deactivate", id), &[], None)
            .await
    }

    /// Run a workflow, optionally with input data
    pub async fn execute_workflow(
        &self,
        id: &str,
        data: Option<ToolParams>,
    ) -> Result<Execution, UpstreamError> {
        let body = data.map(|data| serde_json::json!({ "data": data }));
        self.request(Method::POST, &format!("/workflows/{}/run", id), &[], body)
            .await
    }

    pub async fn list_executions(
        &self,
        workflow_id: Option<&str>,
        limit: u64,
    ) -> Result<ListResponse<Execution>, UpstreamError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(workflow_id) = workflow_id {
            query.push(("workflowId", workflow_id.to_string()));
        }
        self.request(Method::GET, "/executions", &query, None).await
    }

    pub async fn get_execution(&self, id: &str) -> Result<Execution, UpstreamError> {
        self.request(Method::GET, &format!("/executions/{}", id), &[], None)
            .await
    }

    pub async fn list_credentials(&self) -> Result<ListResponse<Credential>, UpstreamError> {
        self.request(Method::GET, "/credentials", &[], None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> ServiceConfig {
        ServiceConfig::new()
            .with(keys::N8N_API_URL, format!("{}/", server.uri()))
            .with(keys::N8N_API_KEY, "n8n-key")
    }

    #[test]
    fn test_requires_url_and_key() {
        let err = N8nClient::from_config(&ServiceConfig::new()).unwrap_err();
        assert_eq!(err.to_string(), "N8N_API_URL is required");

        let err = N8nClient::from_config(
            &ServiceConfig::new().with(keys::N8N_API_URL, "https://n8n.example.com"),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "N8N_API_KEY is required");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = N8nClient::from_config(
            &ServiceConfig::new()
                .with(keys::N8N_API_URL, "https://n8n.example.com/")
                .with(keys::N8N_API_KEY, "k"),
        )
        .unwrap();
        assert_eq!(client.url("/workflows"), "https://n8n.example.com/api/v1/workflows");
    }

    #[tokio::test]
    async fn test_list_executions_filters_by_workflow() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/executions"))
            .and(query_param("limit", "5"))
            .and(query_param("workflowId", "wf1"))
            .and(header("X-N8N-API-KEY", "n8n-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 1, "finished": true, "workflowId": "wf1", "status": "success"}]
            })))
            .mount(&server)
            .await;

        let client = N8nClient::from_config(&config(&server)).unwrap();
        let page = client.list_executions(Some("wf1"), 5).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "1");
    }

    #[tokio::test]
    async fn test_execute_workflow_sends_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/workflows/wf1/run"))
            .and(body_json(json!({"data": {"email": "a@b.c"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "99",
                "workflowId": "wf1",
                "status": "running",
                "startedAt": "2024-05-01T10:00:00.000Z"
            })))
            .mount(&server)
            .await;

        let client = N8nClient::from_config(&config(&server)).unwrap();
        let data = json!({"email": "a@b.c"}).as_object().cloned();
        let execution = client.execute_workflow("wf1", data).await.unwrap();
        assert_eq!(execution.id, "99");
        assert_eq!(execution.status.as_deref(), Some("running"));
    }

    #[tokio::test]
    async fn test_list_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "c1", "name": "Slack", "type": "slackApi"}]
            })))
            .mount(&server)
            .await;

        let client = N8nClient::from_config(&config(&server)).unwrap();
        let page = client.list_credentials().await.unwrap();
        assert_eq!(page.data[0].kind, "slackApi");
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/workflows/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not found"}"#))
            .mount(&server)
            .await;

        let client = N8nClient::from_config(&config(&server)).unwrap();
        let err = client.get_workflow("missing").await.unwrap_err();
        assert_eq!(err.to_string(), r#"n8n API error (404): {"message":"Not found"}"#);
    }
}
