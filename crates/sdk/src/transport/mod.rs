//! Transport layer for the MCP Base SDK.

pub mod http;

pub use http::HttpTransport;
