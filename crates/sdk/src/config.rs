//! Configuration types for the MCP Base SDK.

use mcp_base_core::ServiceConfig;
use std::time::Duration;
use url::Url;

/// Configuration for the MCP Base client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the MCP Base server.
    pub base_url: Url,
    /// Credentials sent as headers with every request.
    pub credentials: ServiceConfig,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials: ServiceConfig::new(),
            timeout: Duration::from_secs(30),
        }
    }
}
