//! MCP wire types, protocol constants, and schema helpers

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// MCP protocol versions
pub const PROTOCOL_VERSION_2024_11_05: &str = "2024-11-05";
pub const PROTOCOL_VERSION_2025_03_26: &str = "2025-03-26";
pub const PROTOCOL_VERSION_2025_06_18: &str = "2025-06-18";
pub const LATEST_PROTOCOL_VERSION: &str = PROTOCOL_VERSION_2025_06_18;

pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &[
    PROTOCOL_VERSION_2024_11_05,
    PROTOCOL_VERSION_2025_03_26,
    PROTOCOL_VERSION_2025_06_18,
];

// MCP method names
pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_PING: &str = "ping";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Tool definition as listed by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self { name: name.into(), description: description.into(), input_schema }
    }
}

/// `tools/list` response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
}

/// `tools/call` request params
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// One content block inside a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

/// `tools/call` response payload
///
/// Success carries a single text block; failures carry `Error: <message>`
/// with the error flag set. Never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Success result with free-form text
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![ToolContent::Text { text: text.into() }], is_error: false }
    }

    /// Success result with the payload pretty-printed as JSON
    pub fn json(value: &Value) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(e),
        }
    }

    /// Error result: `Error: <message>` with the error flag set
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![ToolContent::Text { text: format!("Error: {}", message) }],
            is_error: true,
        }
    }

    /// The text of the first content block (tests and logging)
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(ToolContent::Text { text }) => text,
            None => "",
        }
    }
}

/// `initialize` request params; lenient so older clients still negotiate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion", default)]
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(rename = "clientInfo", default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<Implementation>,
}

/// `initialize` response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: Implementation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server or client identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Pick the protocol version to answer with: echo the client's version when
/// supported, otherwise fall back to the latest this server speaks.
pub fn negotiate_protocol_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == requested)
        .copied()
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

// JSON-schema builders for tool catalogs. Descriptors are data; these keep
// the declarations compact.

/// Object schema from (property name, property schema) pairs plus the
/// required property names.
pub fn json_schema_object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let props: serde_json::Map<String, Value> =
        properties.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    json!({
        "type": "object",
        "properties": props,
        "required": required,
    })
}

pub fn json_schema_string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub fn json_schema_number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

pub fn json_schema_boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

pub fn json_schema_array(description: &str, items: Value) -> Value {
    json!({ "type": "array", "description": description, "items": items })
}

pub fn json_schema_enum(description: &str, values: &[&str]) -> Value {
    json!({ "type": "string", "enum": values, "description": description })
}

pub fn json_schema_object_prop(description: &str) -> Value {
    json!({ "type": "object", "description": description })
}

/// Attach a `default` to a property schema
pub fn with_default(mut schema: Value, default: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("default".to_string(), default);
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_result_pretty_prints_payload() {
        let result = CallToolResult::json(&json!({"id": 1, "name": "demo"}));
        assert!(!result.is_error);
        let text = result.first_text();
        assert!(text.contains("{\n"));
        assert!(text.contains("\"name\": \"demo\""));
    }

    #[test]
    fn error_result_carries_prefix_and_flag() {
        let result = CallToolResult::error("backend unreachable");
        assert!(result.is_error);
        assert_eq!(result.first_text(), "Error: backend unreachable");
    }

    #[test]
    fn error_flag_omitted_when_false() {
        let ok = serde_json::to_string(&CallToolResult::text("fine")).unwrap();
        assert!(!ok.contains("isError"));

        let failed = serde_json::to_string(&CallToolResult::error("bad")).unwrap();
        assert!(failed.contains("\"isError\":true"));
    }

    #[test]
    fn version_negotiation() {
        assert_eq!(negotiate_protocol_version("2024-11-05"), "2024-11-05");
        assert_eq!(negotiate_protocol_version("1999-01-01"), LATEST_PROTOCOL_VERSION);
        assert_eq!(negotiate_protocol_version(""), LATEST_PROTOCOL_VERSION);
    }

    #[test]
    fn schema_builders_compose() {
        let schema = json_schema_object(
            &[
                ("name", json_schema_string("Name")),
                ("count", with_default(json_schema_number("How many"), json!(30))),
            ],
            &["name"],
        );
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["count"]["default"], 30);
        assert_eq!(schema["required"][0], "name");
    }
}
