//! Error handling for the MCP server loop

use crate::jsonrpc::JsonRpcError;
use thiserror::Error;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur while handling an MCP message
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Convert to a JSON-RPC error object
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            McpError::InvalidRequest(msg) => {
                JsonRpcError::invalid_request().with_data(serde_json::json!({ "message": msg }))
            }
            McpError::InvalidParams(msg) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({ "message": msg }))
            }
            McpError::MethodNotFound(method) => {
                JsonRpcError::method_not_found().with_data(serde_json::json!({ "method": method }))
            }
            _ => JsonRpcError::internal_error()
                .with_data(serde_json::json!({ "message": self.to_string() })),
        }
    }
}
