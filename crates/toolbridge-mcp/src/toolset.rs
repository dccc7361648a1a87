//! Dispatch seam between the MCP server loop and a server's tools

use crate::catalog::ToolCatalog;
use crate::protocol::CallToolResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A server's tool surface: the static catalog plus name-keyed dispatch.
///
/// `call` is infallible at the transport level: unknown names, invalid
/// arguments, and backend failures all come back as error-flagged results.
#[async_trait]
pub trait ToolSet: Send + Sync {
    fn catalog(&self) -> &ToolCatalog;

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult;
}

/// Invalid tool arguments, reported before any backend call
#[derive(Debug)]
pub struct ArgsError(String);

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid arguments: {}", self.0)
    }
}

impl std::error::Error for ArgsError {}

/// Deserialize a tool's argument record, treating absent arguments as `{}`
/// so optional-only tools accept empty calls.
pub fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ArgsError> {
    let value = if arguments.is_null() { Value::Object(serde_json::Map::new()) } else { arguments };
    serde_json::from_value(value).map_err(|e| ArgsError(e.to_string()))
}
