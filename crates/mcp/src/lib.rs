// MCP (Model Context Protocol) adapter: JSON-RPC 2.0 over HTTP or stdio

pub mod naming;
pub mod protocol;
pub mod server;

pub use naming::{flatten, parse, ToolNameError};
pub use server::McpServer;
