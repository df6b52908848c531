use super::extract::RequestConfig;
use super::{ApiError, ApiResult};
use crate::config::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use mcp_base_core::{ServiceDescriptor, ToolDescriptor, ToolParams, ToolResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// List all registered services
pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<ListServicesResponse> {
    Json(ListServicesResponse {
        services: state.registry.services(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListServicesResponse {
    pub services: Vec<ServiceDescriptor>,
}

/// List the tools of one service
pub async fn list_tools(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<ListToolsResponse>> {
    let service = state
        .registry
        .service(&name)
        .ok_or_else(|| ApiError::not_found(format!("Service \"{}\" not found", name)))?;

    let descriptor = service.descriptor();
    Ok(Json(ListToolsResponse {
        service: descriptor.name.clone(),
        tools: descriptor.tools.clone(),
        config_schema: descriptor.config_schema.clone(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub service: String,
    pub tools: Vec<ToolDescriptor>,
    #[serde(rename = "configSchema", skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<serde_json::Value>,
}

/// Execute a tool of a service
pub async fn execute_tool(
    State(state): State<Arc<AppState>>,
    Path((name, tool)): Path<(String, String)>,
    RequestConfig(config): RequestConfig,
    body: Bytes,
) -> ApiResult<Json<ExecuteToolResponse>> {
    let service = state
        .registry
        .service(&name)
        .ok_or_else(|| ApiError::not_found(format!("Service \"{}\" not found", name)))?;

    if service.tool(&tool).is_none() {
        return Err(ApiError::not_found(format!(
            "Tool \"{}\" not found in service \"{}\"",
            tool, name
        )));
    }

    // A missing or malformed body means no parameters
    let request: ExecuteToolRequest = serde_json::from_slice(&body).unwrap_or_default();

    tracing::info!(service = %name, tool = %tool, "Executing tool via REST");
    let result = state
        .registry
        .execute_tool(&name, &tool, request.params, &config)
        .await;

    Ok(Json(ExecuteToolResponse { result }))
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExecuteToolRequest {
    #[serde(default)]
    pub params: ToolParams,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteToolResponse {
    pub result: ToolResult,
}
