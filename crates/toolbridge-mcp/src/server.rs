//! MCP server: message handling and the stdio serve loop

use std::io::{BufRead, BufReader, Write};

use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{McpError, McpResult};
use crate::jsonrpc::{
    error_response, success_response, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    JSONRPC_VERSION,
};
use crate::protocol::{
    negotiate_protocol_version, CallToolParams, Implementation, InitializeParams,
    InitializeResult, ListToolsResult, ServerCapabilities, ToolsCapability, METHOD_INITIALIZE,
    METHOD_PING, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use crate::toolset::ToolSet;

/// MCP server over a [`ToolSet`]
pub struct McpServer<S: ToolSet> {
    info: Implementation,
    tools: S,
}

impl<S: ToolSet> McpServer<S> {
    pub fn new(name: impl Into<String>, version: impl Into<String>, tools: S) -> Self {
        Self { info: Implementation { name: name.into(), version: version.into() }, tools }
    }

    pub fn tool_set(&self) -> &S {
        &self.tools
    }

    /// Process a single MCP message; `None` means no response goes out
    /// (notifications).
    pub async fn process_message(&self, body: &[u8]) -> McpResult<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Ok(Some(error_response(
                    Some(RequestId::Null),
                    JsonRpcError::parse_error()
                        .with_data(serde_json::json!({ "message": e.to_string() })),
                )));
            }
        };

        debug!("Processing method: {}", request.method);

        if request.jsonrpc != JSONRPC_VERSION {
            return Ok(Some(error_response(
                request.id,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({ "message": "Invalid JSON-RPC version" })),
            )));
        }

        // Notifications carry no id and get no response
        if request.id.is_none() {
            debug!("Received notification: {}", request.method);
            return Ok(None);
        }

        let id = request.id.clone();
        let handled = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(&request),
            METHOD_PING => self.handle_ping(&request),
            METHOD_TOOLS_LIST => self.handle_tools_list(&request),
            METHOD_TOOLS_CALL => self.handle_tools_call(&request).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        Ok(Some(handled.unwrap_or_else(|e| error_response(id, e.to_jsonrpc_error()))))
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        let params: InitializeParams = match &request.params {
            Some(params) => serde_json::from_value(params.clone())
                .map_err(|e| McpError::InvalidParams(e.to_string()))?,
            None => InitializeParams {
                protocol_version: String::new(),
                capabilities: Value::Null,
                client_info: None,
            },
        };

        let protocol_version = negotiate_protocol_version(&params.protocol_version);
        if let Some(client) = &params.client_info {
            info!("Client connected: {} {}", client.name, client.version);
        }

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities { tools: ToolsCapability { list_changed: false } },
            server_info: self.info.clone(),
        };

        Ok(success_response(request.id.clone(), serde_json::to_value(result)?))
    }

    fn handle_ping(&self, request: &JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        Ok(success_response(request.id.clone(), serde_json::json!({})))
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        let result = ListToolsResult { tools: self.tools.catalog().tools().to_vec() };
        Ok(success_response(request.id.clone(), serde_json::to_value(result)?))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        let params = request
            .params
            .as_ref()
            .ok_or_else(|| McpError::InvalidParams("Missing params for tools/call".to_string()))?;

        let call: CallToolParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        debug!("Calling tool: {}", call.name);

        let arguments = call.arguments.unwrap_or(Value::Null);
        let result = self.tools.call(&call.name, arguments).await;
        if result.is_error {
            debug!("Tool '{}' returned an error result", call.name);
        }

        Ok(success_response(request.id.clone(), serde_json::to_value(result)?))
    }
}

/// Serve MCP over stdio: one JSON-RPC message per line in, one response per
/// line out. Returns when stdin reaches EOF.
pub async fn serve_stdio<S: ToolSet>(server: McpServer<S>) -> McpResult<()> {
    info!("{} running on stdio ({} tools)", server.info.name, server.tools.catalog().len());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    for line in BufReader::new(stdin).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        // MCP does not support JSON-RPC batches
        if line.trim_start().starts_with('[') {
            error!("Batch requests are not supported");
            let response = error_response(
                Some(RequestId::Null),
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({ "message": "Batch requests are not supported" })),
            );
            writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
            stdout.flush()?;
            continue;
        }

        match server.process_message(line.as_bytes()).await {
            Ok(Some(response)) => {
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                stdout.flush()?;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error processing message: {}", e);
                let response = error_response(Some(RequestId::Null), e.to_jsonrpc_error());
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                stdout.flush()?;
            }
        }
    }

    info!("{} stopped (stdin closed)", server.info.name);
    Ok(())
}
