// Core types and the service registry for MCP Base

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::{keys, ServiceConfig, CREDENTIAL_GROUPS, CREDENTIAL_HEADERS};
pub use error::{ConfigError, RegistryError};
pub use registry::{handler_fn, HandlerTable, RegisteredService, ServiceRegistry, ToolHandler};
pub use types::*;
