//! Errors raised while talking to upstream APIs.

use mcp_base_core::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// A required configuration key is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tool parameters did not match the input schema.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Upstream answered with a non-success status.
    #[error("{service} API error ({status}): {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Transport or decoding failure.
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered, but without the data the tool needs.
    #[error("{0}")]
    Unavailable(String),
}

impl UpstreamError {
    pub(crate) fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http { service, source }
    }

    pub(crate) async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Status {
            service,
            status,
            body,
        }
    }
}
