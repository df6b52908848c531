// JSON-RPC over HTTP

use super::extract::RequestConfig;
use crate::config::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mcp_base_mcp::protocol::{JsonRpcError, JsonRpcResponse};
use std::sync::Arc;

/// Handle one JSON-RPC message.
///
/// Unparseable bodies get a parse error with HTTP 400; notifications are
/// acknowledged with 202 and no body.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    RequestConfig(config): RequestConfig,
    body: Bytes,
) -> Response {
    let value = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting unparseable JSON-RPC body");
            let response = JsonRpcResponse::error(serde_json::Value::Null, JsonRpcError::parse_error());
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    match state.mcp.handle_value(value, &config).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
