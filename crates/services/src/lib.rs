// Upstream integrations exposed as MCP Base services

pub mod error;
pub mod github;
pub mod n8n;

pub use error::UpstreamError;

use mcp_base_core::{
    HandlerTable, RegistryError, ServiceConfig, ServiceDescriptor, ServiceRegistry, ToolDescriptor,
    ToolHandler, ToolParams, ToolResult,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Closed set of tools belonging to one service.
///
/// Descriptors and handlers are both derived from [`ToolSet::ALL`], so every
/// declared tool has exactly one binding.
#[async_trait::async_trait]
pub trait ToolSet: Copy + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn descriptor(self) -> ToolDescriptor;

    async fn run(self, params: ToolParams, config: &ServiceConfig) -> Result<ToolResult, UpstreamError>;
}

/// Handler for one variant of a [`ToolSet`]
struct Binding<T>(T);

#[async_trait::async_trait]
impl<T: ToolSet> ToolHandler for Binding<T> {
    async fn call(&self, params: ToolParams, config: &ServiceConfig) -> anyhow::Result<ToolResult> {
        match self.0.run(params, config).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::debug!(tool = self.0.name(), error = %e, "Upstream call failed");
                Ok(ToolResult::error(e.to_string()))
            }
        }
    }
}

pub fn tool_descriptors<T: ToolSet>() -> Vec<ToolDescriptor> {
    T::ALL.iter().map(|tool| tool.descriptor()).collect()
}

pub fn handlers<T: ToolSet>() -> HandlerTable {
    T::ALL.iter().fold(HandlerTable::new(), |table, &tool| {
        table.with(tool.name(), Arc::new(Binding(tool)))
    })
}

/// Deserialize tool parameters into a typed argument struct
pub(crate) fn parse_args<A: DeserializeOwned>(params: ToolParams) -> Result<A, UpstreamError> {
    serde_json::from_value(serde_json::Value::Object(params))
        .map_err(|e| UpstreamError::InvalidParams(e.to_string()))
}

/// Register every built-in service
pub fn register_all(registry: &mut ServiceRegistry) -> Result<(), RegistryError> {
    let services: [(ServiceDescriptor, HandlerTable); 2] = [
        (github::service(), handlers::<github::GitHubTool>()),
        (n8n::service(), handlers::<n8n::N8nTool>()),
    ];

    for (descriptor, table) in services {
        registry.register(descriptor, table)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let mut registry = ServiceRegistry::new();
        register_all(&mut registry).unwrap();

        let names: Vec<_> = registry.services().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["github", "n8n"]);
        assert_eq!(registry.service("github").unwrap().tools().len(), 8);
        assert_eq!(registry.service("n8n").unwrap().tools().len(), 7);
    }

    #[test]
    fn test_every_descriptor_has_a_binding() {
        let github = handlers::<github::GitHubTool>();
        for tool in tool_descriptors::<github::GitHubTool>() {
            assert!(github.contains(&tool.name), "missing {}", tool.name);
        }

        let n8n = handlers::<n8n::N8nTool>();
        for tool in tool_descriptors::<n8n::N8nTool>() {
            assert!(n8n.contains(&tool.name), "missing {}", tool.name);
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_become_error_results() {
        let mut registry = ServiceRegistry::new();
        register_all(&mut registry).unwrap();

        let params = serde_json::json!({"query": "tokio"}).as_object().cloned().unwrap();
        let result = registry
            .execute_tool("github", "find_repo", params, &ServiceConfig::new())
            .await;
        assert!(result.is_error);
        assert_eq!(result.text(), "GITHUB_TOKEN is required");

        let result = registry
            .execute_tool("n8n", "list_workflows", ToolParams::new(), &ServiceConfig::new())
            .await;
        assert!(result.is_error);
        assert_eq!(result.text(), "N8N_API_URL is required");
    }

    #[tokio::test]
    async fn test_invalid_params_become_error_results() {
        let mut registry = ServiceRegistry::new();
        register_all(&mut registry).unwrap();

        let config = ServiceConfig::new().with("GITHUB_TOKEN", "t");
        let result = registry
            .execute_tool("github", "get_issue", ToolParams::new(), &config)
            .await;
        assert!(result.is_error);
        assert!(result.text().starts_with("Invalid parameters"));
    }
}
