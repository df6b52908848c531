// MCP server: dispatches JSON-RPC methods against the service registry

use crate::naming;
use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, PROTOCOL_VERSION,
};
use anyhow::{Context, Result};
use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use mcp_base_core::{ServiceConfig, ServiceRegistry, ToolDescriptor};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError};

const INVALID_TOOL_NAME: &str = "Invalid tool name format. Expected: service__tool";

/// Longest stdio message accepted before it is rejected unread
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8 * 1024 * 1024;

pub struct McpServer {
    registry: Arc<ServiceRegistry>,
    server_info: ServerInfo,
    max_line_length: usize,
}

impl McpServer {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            server_info: ServerInfo::default(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Every tool of every service under its flattened name
    pub fn list_tools(&self) -> ListToolsResult {
        let tools = self
            .registry
            .services()
            .into_iter()
            .flat_map(|service| {
                service.tools.into_iter().map(move |tool| ToolDescriptor {
                    name: naming::flatten(&service.name, &tool.name),
                    description: format!("[{}] {}", service.name, tool.description),
                    input_schema: tool.input_schema,
                })
            })
            .collect();

        ListToolsResult { tools }
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str, config: &ServiceConfig) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => self.handle_value(value, config).await,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting unparseable JSON-RPC message");
                Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    JsonRpcError::parse_error(),
                ))
            }
        }
    }

    /// Handle an already parsed JSON value
    pub async fn handle_value(
        &self,
        value: serde_json::Value,
        config: &ServiceConfig,
    ) -> Option<JsonRpcResponse> {
        let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request, config).await,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting malformed JSON-RPC request");
                Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()))
            }
        }
    }

    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        config: &ServiceConfig,
    ) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, "Handling JSON-RPC request");

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "Ignoring notification");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities::default(),
                    server_info: self.server_info.clone(),
                },
            ),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.list_tools()),
            "tools/call" => match self.call_tool(request.params, config).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(error) => JsonRpcResponse::error(id, error),
            },
            method => JsonRpcResponse::error(id, JsonRpcError::method_not_found(method)),
        };

        Some(response)
    }

    async fn call_tool(
        &self,
        params: Option<serde_json::Value>,
        config: &ServiceConfig,
    ) -> Result<mcp_base_core::ToolResult, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| {
                    JsonRpcError::invalid_params(format!("Invalid params for tools/call: {}", e))
                })
            })?;

        let (service, tool) = naming::parse(&params.name).map_err(|e| {
            JsonRpcError::invalid_params(INVALID_TOOL_NAME).with_data(serde_json::json!({
                "name": params.name,
                "reason": e.to_string(),
            }))
        })?;

        Ok(self
            .registry
            .execute_tool(service, tool, params.arguments.unwrap_or_default(), config)
            .await)
    }

    /// Serve newline-delimited JSON-RPC until the reader closes
    pub async fn serve<R, W>(&self, reader: R, writer: W, config: ServiceConfig) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(reader, BoundedLines::new(self.max_line_length));
        let mut sink = FramedWrite::new(writer, LinesCodec::new());

        while let Some(frame) = lines.next().await {
            let response = match frame.context("Failed to read JSON-RPC message")? {
                Frame::Line(line) if line.trim().is_empty() => continue,
                Frame::Line(line) => self.handle_message(&line, &config).await,
                Frame::Oversized => {
                    tracing::warn!(max = self.max_line_length, "Rejecting oversized JSON-RPC message");
                    Some(JsonRpcResponse::error(
                        serde_json::Value::Null,
                        JsonRpcError::invalid_request(),
                    ))
                }
            };

            if let Some(response) = response {
                let encoded = serde_json::to_string(&response)
                    .context("Failed to encode JSON-RPC response")?;
                sink.send(encoded)
                    .await
                    .context("Failed to write JSON-RPC response")?;
            }
        }

        tracing::info!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Serve over the process's stdin and stdout
    pub async fn start(&self, config: ServiceConfig) -> Result<()> {
        tracing::info!(
            services = self.registry.len(),
            tools = self.registry.tool_count(),
            "MCP server listening on stdio"
        );
        self.serve(tokio::io::stdin(), tokio::io::stdout(), config).await
    }
}

enum Frame {
    Line(String),
    Oversized,
}

/// Line decoder that reports overlong lines as a frame instead of failing
/// the stream. The rest of an overlong line is skipped.
struct BoundedLines(LinesCodec);

impl BoundedLines {
    fn new(max_length: usize) -> Self {
        Self(LinesCodec::new_with_max_length(max_length))
    }

    fn frame(result: Result<Option<String>, LinesCodecError>) -> Result<Option<Frame>, LinesCodecError> {
        match result {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(e) => Err(e),
        }
    }
}

impl Decoder for BoundedLines {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Self::frame(self.0.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Self::frame(self.0.decode_eof(buf))
    }
}
