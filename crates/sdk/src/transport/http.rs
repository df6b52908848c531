//! HTTP transport layer for the MCP Base SDK.

use crate::config::ClientConfig;
use crate::error::{McpBaseError, McpBaseResult};
use mcp_base_core::CREDENTIAL_HEADERS;
use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> McpBaseResult<Self> {
        let headers = credential_headers(&config)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL for the given path.
    fn build_url(&self, path: &str) -> McpBaseResult<url::Url> {
        Ok(self.config.base_url.join(path)?)
    }

    /// Send a request, turning non-success statuses into API errors.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> McpBaseResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpBaseError::from_response(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> McpBaseResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        self.execute(self.client.get(url)).await
    }

    /// Execute a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> McpBaseResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request");

        self.execute(self.client.post(url).json(body)).await
    }
}

/// Default headers carrying the configured credentials.
fn credential_headers(config: &ClientConfig) -> McpBaseResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();

    for key in config.credentials.keys() {
        let (name, _) = CREDENTIAL_HEADERS
            .iter()
            .find(|(_, k)| *k == key)
            .ok_or_else(|| McpBaseError::Config(format!("No header carries credential {}", key)))?;
        let value = config.credentials.get(key).unwrap_or_default();

        headers.insert(
            header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| McpBaseError::Config(format!("Invalid header name {}", name)))?,
            header::HeaderValue::from_str(value)
                .map_err(|_| McpBaseError::Config(format!("Invalid value for {}", key)))?,
        );
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_base_core::ServiceConfig;
    use serde::Deserialize;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestResponse {
        message: String,
    }

    fn create_config(base_url: &str, credentials: ServiceConfig) -> Arc<ClientConfig> {
        Arc::new(ClientConfig {
            base_url: url::Url::parse(base_url).unwrap(),
            credentials,
            timeout: Duration::from_secs(30),
        })
    }

    #[tokio::test]
    async fn test_credentials_sent_as_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/services"))
            .and(header("X-GitHub-Token", "ghp_test"))
            .and(header("X-N8N-API-KEY", "n8n-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})),
            )
            .mount(&server)
            .await;

        let credentials = ServiceConfig::new()
            .with("GITHUB_TOKEN", "ghp_test")
            .with("N8N_API_KEY", "n8n-key");
        let transport = HttpTransport::new(create_config(&server.uri(), credentials)).unwrap();

        let result: TestResponse = transport.get("/api/services").await.unwrap();
        assert_eq!(result.message, "ok");
    }

    #[test]
    fn test_unknown_credential_key_rejected() {
        let credentials = ServiceConfig::new().with("SLACK_TOKEN", "x");
        let err = HttpTransport::new(create_config("http://localhost:3001", credentials)).unwrap_err();
        assert!(matches!(err, McpBaseError::Config(_)));
    }

    #[tokio::test]
    async fn test_post_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/create"))
            .and(body_json(serde_json::json!({"name": "test"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "created"})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri(), ServiceConfig::new())).unwrap();
        let result: TestResponse = transport
            .post("/api/create", &serde_json::json!({"name": "test"}))
            .await
            .unwrap();
        assert_eq!(result.message, "created");
    }

    #[tokio::test]
    async fn test_error_on_404() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/notfound"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "Not found"})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri(), ServiceConfig::new())).unwrap();
        let result: McpBaseResult<TestResponse> = transport.get("/api/notfound").await;
        match result {
            Err(McpBaseError::Api { status, message, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not found");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_url_with_trailing_slash() {
        let transport =
            HttpTransport::new(create_config("http://localhost:3001/", ServiceConfig::new())).unwrap();

        let url = transport.build_url("api/health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/health");
    }
}
