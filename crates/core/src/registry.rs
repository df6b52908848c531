// Service registry: maps (service, tool) pairs to handlers and dispatches calls

use crate::config::ServiceConfig;
use crate::error::RegistryError;
use crate::types::{ServiceDescriptor, ToolDescriptor, ToolParams, ToolResult};
use anyhow::Result;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Executable bound to one (service, tool) pair
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool with the caller's parameters and configuration object
    async fn call(&self, params: ToolParams, config: &ServiceConfig) -> Result<ToolResult>;
}

/// Adapter turning an async closure into a [`ToolHandler`]
pub struct FnHandler<F>(F);

#[async_trait::async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(ToolParams, ServiceConfig) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolResult>> + Send,
{
    async fn call(&self, params: ToolParams, config: &ServiceConfig) -> Result<ToolResult> {
        (self.0)(params, config.clone()).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(ToolParams, ServiceConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolResult>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Handlers of one service, keyed by tool name
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(tool.into(), handler);
    }

    pub fn with(mut self, tool: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Self {
        self.insert(tool, handler);
        self
    }

    pub fn get(&self, tool: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(tool)
    }

    pub fn contains(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

/// Internal record: descriptor plus its handlers
#[derive(Debug, Clone)]
pub struct RegisteredService {
    descriptor: ServiceDescriptor,
    handlers: HandlerTable,
}

impl RegisteredService {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.descriptor.tools
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptor.tool(name)
    }

    pub fn handler(&self, tool: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(tool)
    }
}

/// Registry of all services, built once at startup and read-only afterwards
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: Vec<RegisteredService>,
    index: HashMap<String, usize>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service and its handlers.
    ///
    /// Every declared tool must have a handler; otherwise nothing is stored.
    /// A service with an already registered name replaces the old entry.
    pub fn register(
        &mut self,
        descriptor: ServiceDescriptor,
        handlers: HandlerTable,
    ) -> Result<(), RegistryError> {
        if let Some(tool) = descriptor.tools.iter().find(|t| !handlers.contains(&t.name)) {
            return Err(RegistryError::MissingHandler {
                service: descriptor.name.clone(),
                tool: tool.name.clone(),
            });
        }

        let name = descriptor.name.clone();
        let tool_count = descriptor.tools.len();
        let record = RegisteredService {
            descriptor,
            handlers,
        };

        match self.index.get(&name) {
            Some(&position) => {
                tracing::warn!(service = %name, "Service already registered, replacing previous entry");
                self.services[position] = record;
            }
            None => {
                self.index.insert(name.clone(), self.services.len());
                self.services.push(record);
            }
        }

        tracing::info!(service = %name, tools = tool_count, "Registered service");
        Ok(())
    }

    /// All service descriptors in registration order, without handlers
    pub fn services(&self) -> Vec<ServiceDescriptor> {
        self.services.iter().map(|s| s.descriptor.clone()).collect()
    }

    /// Full internal record for one service
    pub fn service(&self, name: &str) -> Option<&RegisteredService> {
        self.index.get(name).map(|&position| &self.services[position])
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Total number of tools across all services
    pub fn tool_count(&self) -> usize {
        self.services.iter().map(|s| s.descriptor.tools.len()).sum()
    }

    /// Execute a tool.
    ///
    /// Unknown services or tools, handler errors and handler panics all come
    /// back as error results; this never fails.
    pub async fn execute_tool(
        &self,
        service_name: &str,
        tool_name: &str,
        params: ToolParams,
        config: &ServiceConfig,
    ) -> ToolResult {
        let Some(service) = self.service(service_name) else {
            return ToolResult::error(format!("Service \"{}\" not found", service_name));
        };

        let Some(handler) = service.handler(tool_name) else {
            return ToolResult::error(format!(
                "Tool \"{}\" not found in service \"{}\"",
                tool_name, service_name
            ));
        };

        tracing::debug!(service = service_name, tool = tool_name, "Executing tool");

        match AssertUnwindSafe(handler.call(params, config)).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(service = service_name, tool = tool_name, error = %e, "Tool handler failed");
                ToolResult::from_error(&e)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(service = service_name, tool = tool_name, panic = %message, "Tool handler panicked");
                ToolResult::error(format!(
                    "Tool \"{}\" in service \"{}\" panicked: {}",
                    tool_name, service_name, message
                ))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
