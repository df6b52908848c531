// Standalone MCP server binary (JSON-RPC over stdio)

use anyhow::{Context, Result};
use mcp_base_core::{ServiceConfig, ServiceRegistry};
use mcp_base_mcp::McpServer;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_base=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("MCP Base stdio server starting...");

    let mut registry = ServiceRegistry::new();
    mcp_base_services::register_all(&mut registry).context("Failed to register services")?;

    tracing::info!(
        "Registered {} services with {} tools",
        registry.len(),
        registry.tool_count()
    );

    // Credentials come from the environment for the whole session
    let config = ServiceConfig::from_env();
    tracing::info!(keys = ?config.keys().collect::<Vec<_>>(), "Loaded configuration from environment");

    let server = McpServer::new(Arc::new(registry));
    server.start(config).await?;

    Ok(())
}
