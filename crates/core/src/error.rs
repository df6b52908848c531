// Error types for registration and configuration lookups

/// Registration-time failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Service \"{service}\" tool \"{tool}\" has no handler")]
    MissingHandler { service: String, tool: String },
}

/// Configuration object lookup failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(String),
}
