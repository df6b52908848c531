// n8n service: manage and execute workflows

mod client;
pub mod types;

pub use client::N8nClient;

use crate::error::UpstreamError;
use crate::{parse_args, tool_descriptors, ToolSet};
use mcp_base_core::{
    json_schema_number, json_schema_object, json_schema_string, keys, ServiceConfig,
    ServiceDescriptor, ToolDescriptor, ToolParams, ToolResult,
};
use serde::{Deserialize, Deserializer};
use serde_json::json;

pub const SERVICE_NAME: &str = "n8n";

const DEFAULT_WORKFLOW_LIMIT: u64 = 100;
const DEFAULT_EXECUTION_LIMIT: u64 = 20;

pub fn service() -> ServiceDescriptor {
    ServiceDescriptor::new(
        SERVICE_NAME,
        "n8n workflow automation - manage and execute workflows",
    )
    .with_tools(tool_descriptors::<N8nTool>())
    .with_config_schema(json_schema_object(
        json!({
            "N8N_API_URL": json_schema_string("n8n instance URL (e.g., https://n8n.example.com)"),
            "N8N_API_KEY": json_schema_string("n8n API Key")
        }),
        vec![keys::N8N_API_URL, keys::N8N_API_KEY],
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum N8nTool {
    ListWorkflows,
    GetWorkflow,
    ActivateWorkflow,
    DeactivateWorkflow,
    ExecuteWorkflow,
    ListExecutions,
    GetExecution,
}

fn id_schema(description: &str) -> serde_json::Value {
    json_schema_object(json!({"id": json_schema_string(description)}), vec!["id"])
}

fn limit_schema(description: &str, default: u64) -> serde_json::Value {
    let mut schema = json_schema_number(description);
    schema["default"] = json!(default);
    schema
}

#[derive(Debug, Deserialize)]
struct LimitArgs {
    #[serde(default, deserialize_with = "lenient_limit")]
    limit: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ExecuteArgs {
    id: String,
    #[serde(default)]
    data: Option<ToolParams>,
}

#[derive(Debug, Deserialize)]
struct ListExecutionsArgs {
    #[serde(default)]
    workflow_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_limit")]
    limit: Option<f64>,
}

/// Accept limits sent as numbers or numeric strings; anything else is unset
fn lenient_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Limit {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Limit>::deserialize(deserializer)? {
        Some(Limit::Number(n)) => Some(n),
        Some(Limit::Text(s)) => s.trim().parse().ok(),
        Some(Limit::Other(_)) | None => None,
    })
}

/// Missing, zero or negative limits fall back to the default
fn effective_limit(limit: Option<f64>, default: u64) -> u64 {
    match limit {
        Some(limit) if limit >= 1.0 => limit as u64,
        _ => default,
    }
}

#[async_trait::async_trait]
impl ToolSet for N8nTool {
    const ALL: &'static [Self] = &[
        Self::ListWorkflows,
        Self::GetWorkflow,
        Self::ActivateWorkflow,
        Self::DeactivateWorkflow,
        Self::ExecuteWorkflow,
        Self::ListExecutions,
        Self::GetExecution,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::ListWorkflows => "list_workflows",
            Self::GetWorkflow => "get_workflow",
            Self::ActivateWorkflow => "activate_workflow",
            Self::DeactivateWorkflow => "deactivate_workflow",
            Self::ExecuteWorkflow => "execute_workflow",
            Self::ListExecutions => "list_executions",
            Self::GetExecution => "get_execution",
        }
    }

    fn descriptor(self) -> ToolDescriptor {
        let (description, schema) = match self {
            Self::ListWorkflows => (
                "List all n8n workflows",
                json_schema_object(
                    json!({
                        "limit": limit_schema("Maximum number of workflows to return", DEFAULT_WORKFLOW_LIMIT)
                    }),
                    vec![],
                ),
            ),
            Self::GetWorkflow => (
                "Get details of a specific workflow including nodes and connections",
                id_schema("Workflow ID"),
            ),
            Self::ActivateWorkflow => ("Activate a workflow", id_schema("Workflow ID")),
            Self::DeactivateWorkflow => ("Deactivate a workflow", id_schema("Workflow ID")),
            Self::ExecuteWorkflow => (
                "Execute a workflow with optional input data",
                json_schema_object(
                    json!({
                        "id": json_schema_string("Workflow ID"),
                        "data": {
                            "type": "object",
                            "description": "Optional input data for the workflow",
                            "additionalProperties": true
                        }
                    }),
                    vec!["id"],
                ),
            ),
            Self::ListExecutions => (
                "List workflow executions",
                json_schema_object(
                    json!({
                        "workflow_id": json_schema_string("Filter by workflow ID"),
                        "limit": limit_schema("Maximum number of executions to return", DEFAULT_EXECUTION_LIMIT)
                    }),
                    vec![],
                ),
            ),
            Self::GetExecution => (
                "Get details of a specific execution",
                id_schema("Execution ID"),
            ),
        };

        ToolDescriptor::new(self.name(), description, schema)
    }

    async fn run(self, params: ToolParams, config: &ServiceConfig) -> Result<ToolResult, UpstreamError> {
        let client = N8nClient::from_config(config)?;

        match self {
            Self::ListWorkflows => {
                let args: LimitArgs = parse_args(params)?;
                let page = client
                    .list_workflows(effective_limit(args.limit, DEFAULT_WORKFLOW_LIMIT))
                    .await?;
                let workflows: Vec<_> = page
                    .data
                    .iter()
                    .map(|w| {
                        json!({
                            "id": w.id,
                            "name": w.name,
                            "active": w.active,
                            "updatedAt": w.updated_at,
                            "tags": w.tags.as_ref().map(|tags| tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()),
                        })
                    })
                    .collect();

                Ok(ToolResult::json(&json!({
                    "count": workflows.len(),
                    "workflows": workflows,
                })))
            }
            Self::GetWorkflow => {
                let args: IdArgs = parse_args(params)?;
                let w = client.get_workflow(&args.id).await?;
                let nodes = w.nodes.as_ref().map(|nodes| {
                    nodes
                        .iter()
                        .map(|n| json!({"id": n.id, "name": n.name, "type": n.kind}))
                        .collect::<Vec<_>>()
                });

                Ok(ToolResult::json(&json!({
                    "id": w.id,
                    "name": w.name,
                    "active": w.active,
                    "nodes": nodes,
                    "tags": w.tags.as_ref().map(|tags| tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()),
                    "createdAt": w.created_at,
                    "updatedAt": w.updated_at,
                })))
            }
            Self::ActivateWorkflow => {
                let args: IdArgs = parse_args(params)?;
                let w = client.activate_workflow(&args.id).await?;
                Ok(ToolResult::json(&json!({
                    "id": w.id,
                    "name": w.name,
                    "active": w.active,
                    "message": "Workflow activated successfully",
                })))
            }
            Self::DeactivateWorkflow => {
                let args: IdArgs = parse_args(params)?;
                let w = client.deactivate_workflow(&args.id).await?;
                Ok(ToolResult::json(&json!({
                    "id": w.id,
                    "name": w.name,
                    "active": w.active,
                    "message": "Workflow deactivated successfully",
                })))
            }
            Self::ExecuteWorkflow => {
                let args: ExecuteArgs = parse_args(params)?;
                let execution = client.execute_workflow(&args.id, args.data).await?;
                Ok(ToolResult::json(&json!({
                    "executionId": execution.id,
                    "status": execution.status,
                    "startedAt": execution.started_at,
                    "workflowId": execution.workflow_id,
                })))
            }
            Self::ListExecutions => {
                let args: ListExecutionsArgs = parse_args(params)?;
                let page = client
                    .list_executions(
                        args.workflow_id.as_deref(),
                        effective_limit(args.limit, DEFAULT_EXECUTION_LIMIT),
                    )
                    .await?;
                let executions: Vec<_> = page
                    .data
                    .iter()
                    .map(|e| {
                        json!({
                            "id": e.id,
                            "workflowId": e.workflow_id,
                            "workflowName": e.workflow_name,
                            "status": e.status,
                            "startedAt": e.started_at,
                            "stoppedAt": e.stopped_at,
                        })
                    })
                    .collect();

                Ok(ToolResult::json(&json!({
                    "count": executions.len(),
                    "executions": executions,
                })))
            }
            Self::GetExecution => {
                let args: IdArgs = parse_args(params)?;
                let e = client.get_execution(&args.id).await?;
                Ok(ToolResult::json(&json!({
                    "id": e.id,
                    "workflowId": e.workflow_id,
                    "status": e.status,
                    "finished": e.finished,
                    "startedAt": e.started_at,
                    "stoppedAt": e.stopped_at,
                    "error": e.error_message(),
                })))
            }
        }
    }
}
