use crate::config::AppState;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use mcp_base_core::{ServiceConfig, CREDENTIAL_HEADERS};
use std::convert::Infallible;
use std::sync::Arc;

/// Per-request service configuration: server defaults overlaid with
/// credential headers, one credential group at a time
#[derive(Debug, Clone)]
pub struct RequestConfig(pub ServiceConfig);

impl FromRequestParts<Arc<AppState>> for RequestConfig {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let config = state.defaults.clone().overlay(config_from_headers(&parts.headers));
        Ok(Self(config))
    }
}

/// Map recognized credential headers to configuration keys.
///
/// Empty or non-ASCII header values are ignored.
pub fn config_from_headers(headers: &HeaderMap) -> ServiceConfig {
    CREDENTIAL_HEADERS
        .iter()
        .filter_map(|(header, key)| {
            let value = headers.get(*header)?.to_str().ok()?.trim();
            (!value.is_empty()).then(|| (*key, value.to_string()))
        })
        .collect()
}
