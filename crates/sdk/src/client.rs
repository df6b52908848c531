//! Main client for the MCP Base SDK.

use crate::config::ClientConfig;
use crate::error::{McpBaseError, McpBaseResult};
use crate::transport::HttpTransport;
use mcp_base_core::{ServiceConfig, ServiceDescriptor, ToolDescriptor, ToolParams, ToolResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for interacting with the MCP Base API.
#[derive(Debug, Clone)]
pub struct McpBaseClient {
    config: Arc<ClientConfig>,
    http: HttpTransport,
}

impl McpBaseClient {
    /// Create a new client builder.
    pub fn builder() -> McpBaseClientBuilder {
        McpBaseClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> McpBaseResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List all registered services.
    pub async fn services(&self) -> McpBaseResult<Vec<ServiceDescriptor>> {
        let response: ServicesResponse = self.http.get("/api/services").await?;
        Ok(response.services)
    }

    /// List the tools of one service.
    pub async fn tools(&self, service: &str) -> McpBaseResult<ServiceTools> {
        self.http
            .get(&format!("/api/services/{}/tools", service))
            .await
    }

    /// Execute a tool. Tool-level failures come back as a result with
    /// `is_error` set, not as an `Err`.
    pub async fn execute(
        &self,
        service: &str,
        tool: &str,
        params: ToolParams,
    ) -> McpBaseResult<ToolResult> {
        let response: ExecuteResponse = self
            .http
            .post(
                &format!("/api/services/{}/tools/{}", service, tool),
                &ExecuteRequest { params },
            )
            .await?;
        Ok(response.result)
    }

    /// Check server health.
    pub async fn health(&self) -> McpBaseResult<HealthCheck> {
        self.http.get("/api/health").await
    }
}

#[derive(Debug, Deserialize)]
struct ServicesResponse {
    services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest {
    params: ToolParams,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    result: ToolResult,
}

/// Tools of a single service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTools {
    pub service: String,
    pub tools: Vec<ToolDescriptor>,
    #[serde(rename = "configSchema", default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<serde_json::Value>,
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub services: usize,
}

/// Builder for creating a McpBaseClient.
pub struct McpBaseClientBuilder {
    base_url: Option<String>,
    credentials: ServiceConfig,
    timeout: Duration,
}

impl McpBaseClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: ServiceConfig::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the base URL of the MCP Base server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a credential, such as `GITHUB_TOKEN`, sent with every request.
    pub fn credential(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials.insert(key, value);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> McpBaseResult<McpBaseClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| McpBaseError::Config("base_url is required".to_string()))?;

        let base_url = Url::parse(&base_url_str)?;

        let config = ClientConfig {
            base_url,
            credentials: self.credentials,
            timeout: self.timeout,
        };

        McpBaseClient::from_config(config)
    }
}

impl Default for McpBaseClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> McpBaseClient {
        McpBaseClient::builder()
            .base_url(server.uri())
            .credential("GITHUB_TOKEN", "ghp_test")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let err = McpBaseClient::builder().build().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: base_url is required");
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let err = McpBaseClient::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, McpBaseError::InvalidUrl(_)));
    }

    #[test]
    fn test_builder_settings() {
        let client = McpBaseClient::builder()
            .base_url("http://localhost:3001")
            .credential("N8N_API_URL", "https://n8n.example.com")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(client.config().timeout, Duration::from_secs(5));
        assert_eq!(
            client.config().credentials.get("N8N_API_URL"),
            Some("https://n8n.example.com")
        );
    }

    #[tokio::test]
    async fn test_services() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "services": [{
                    "name": "github",
                    "description": "GitHub",
                    "tools": [{"name": "find_repo", "description": "Find", "inputSchema": {"type": "object"}}]
                }]
            })))
            .mount(&server)
            .await;

        let services = client(&server).services().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "github");
        assert_eq!(services[0].tools[0].name, "find_repo");
    }

    #[tokio::test]
    async fn test_tools_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/services/gitlab/tools"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Service \"gitlab\" not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).tools("gitlab").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "API error (status 404): Service \"gitlab\" not found"
        );
    }

    #[tokio::test]
    async fn test_execute() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/services/github/tools/find_repo"))
            .and(header("X-GitHub-Token", "ghp_test"))
            .and(body_json(json!({"params": {"query": "tokio"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"content": [{"type": "text", "text": "[]"}], "isError": false}
            })))
            .mount(&server)
            .await;

        let params = json!({"query": "tokio"}).as_object().cloned().unwrap();
        let result = client(&server)
            .execute("github", "find_repo", params)
            .await
            .unwrap();
        assert!(!result.is_error);
        assert_eq!(result.text(), "[]");
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "services": 2})))
            .mount(&server)
            .await;

        let health = client(&server).health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.services, 2);
    }
}
