use anyhow::{Context, Result};
use mcp_base_core::{ServiceConfig, ServiceRegistry};
use mcp_base_mcp::McpServer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    /// Configuration values applied to every request unless a header overrides them
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::info!("Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .context("Failed to read configuration file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse configuration file")?;

        tracing::info!(
            path = %config_path.display(),
            credentials = config.credentials.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Address to bind, with CLI overrides applied
    pub fn bind_addr(&self, host: Option<&str>, port: Option<u16>) -> String {
        format!(
            "{}:{}",
            host.unwrap_or(&self.server.host),
            port.unwrap_or(self.server.port)
        )
    }

    pub fn default_service_config(&self) -> ServiceConfig {
        self.credentials
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub mcp: Arc<McpServer>,
    pub defaults: ServiceConfig,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut registry = ServiceRegistry::new();
        mcp_base_services::register_all(&mut registry).context("Failed to register services")?;

        tracing::info!(
            "Registered {} services with {} tools",
            registry.len(),
            registry.tool_count()
        );

        Ok(Self::with_registry(registry, config.default_service_config()))
    }

    /// Freeze a fully registered registry into shared state
    pub fn with_registry(registry: ServiceRegistry, defaults: ServiceConfig) -> Self {
        let registry = Arc::new(registry);
        let mcp = Arc::new(McpServer::new(registry.clone()));

        Self {
            registry,
            mcp,
            defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig::load(&temp_dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.bind_addr(None, None), "127.0.0.1:3001");
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn test_load_file_and_cli_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mcp-base.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[credentials]
N8N_API_URL = "https://n8n.internal"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.bind_addr(None, None), "127.0.0.1:8080");
        assert_eq!(config.bind_addr(Some("0.0.0.0"), Some(9000)), "0.0.0.0:9000");
        assert_eq!(
            config.default_service_config().get("N8N_API_URL"),
            Some("https://n8n.internal")
        );
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = ServerConfig::load(&path).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse configuration file");
    }

    #[test]
    fn test_app_state_registers_builtin_services() {
        let state = AppState::new(&ServerConfig::default()).unwrap();
        assert_eq!(state.registry.len(), 2);
        assert_eq!(state.mcp.list_tools().tools.len(), state.registry.tool_count());
    }
}
