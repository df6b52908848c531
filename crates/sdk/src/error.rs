//! Error types for the MCP Base SDK.

use serde::{Deserialize, Serialize};

/// Result type for SDK operations.
pub type McpBaseResult<T> = Result<T, McpBaseError>;

/// Error types that can occur when using the MCP Base SDK.
#[derive(Debug, thiserror::Error)]
pub enum McpBaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl McpBaseError {
    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(error_response) => Self::Api {
                status,
                message: error_response.error,
                details: error_response.details,
            },
            Err(_) => Self::Api {
                status,
                message: body.to_string(),
                details: None,
            },
        }
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error response from the MCP Base API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_error_body() {
        let err = McpBaseError::from_response(404, r#"{"error":"Service \"x\" not found"}"#);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API error (status 404): Service \"x\" not found");
    }

    #[test]
    fn test_from_plain_body() {
        match McpBaseError::from_response(502, "Bad Gateway") {
            McpBaseError::Api { message, details, .. } => {
                assert_eq!(message, "Bad Gateway");
                assert!(details.is_none());
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}
