//! # MCP Base SDK
//!
//! Rust client for the MCP Base REST API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mcp_base_sdk::{McpBaseClient, McpBaseResult};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> McpBaseResult<()> {
//!     let client = McpBaseClient::builder()
//!         .base_url("http://localhost:3001")
//!         .credential("GITHUB_TOKEN", "ghp_your_token")
//!         .build()?;
//!
//!     // List services and their tools
//!     for service in client.services().await? {
//!         println!("{}: {} tools", service.name, service.tools.len());
//!     }
//!
//!     // Run a tool
//!     let params = json!({"query": "tokio"}).as_object().cloned().unwrap_or_default();
//!     let result = client.execute("github", "find_repo", params).await?;
//!     println!("{}", result.text());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{HealthCheck, McpBaseClient, McpBaseClientBuilder, ServiceTools};
pub use config::ClientConfig;
pub use error::{McpBaseError, McpBaseResult};

// Re-export core types for convenience
pub use mcp_base_core::{ServiceConfig, ServiceDescriptor, ToolDescriptor, ToolParams, ToolResult};
