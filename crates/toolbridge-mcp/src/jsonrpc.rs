//! JSON-RPC 2.0 types and utilities

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

// Error codes (from JSON-RPC 2.0 spec)
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 request ID (string, number, or null)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    Null,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<RequestId>,
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: String) -> Self {
        Self { code, message, data: None }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error".to_string())
    }

    pub fn invalid_request() -> Self {
        Self::new(INVALID_REQUEST, "Invalid Request".to_string())
    }

    pub fn method_not_found() -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found".to_string())
    }

    pub fn invalid_params() -> Self {
        Self::new(INVALID_PARAMS, "Invalid params".to_string())
    }

    pub fn internal_error() -> Self {
        Self::new(INTERNAL_ERROR, "Internal error".to_string())
    }
}

/// Create a successful JSON-RPC response
pub fn success_response(id: Option<RequestId>, result: Value) -> JsonRpcResponse {
    JsonRpcResponse { jsonrpc: JSONRPC_VERSION.to_string(), result: Some(result), error: None, id }
}

/// Create an error JSON-RPC response
pub fn error_response(id: Option<RequestId>, error: JsonRpcError) -> JsonRpcResponse {
    JsonRpcResponse { jsonrpc: JSONRPC_VERSION.to_string(), result: None, error: Some(error), id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_roundtrip() {
        let s: RequestId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(s, RequestId::String("abc".to_string()));

        let n: RequestId = serde_json::from_str("42").unwrap();
        assert_eq!(n, RequestId::Number(42));

        let null: RequestId = serde_json::from_str("null").unwrap();
        assert_eq!(null, RequestId::Null);
        assert_eq!(serde_json::to_string(&null).unwrap(), "null");
    }

    #[test]
    fn error_response_shape() {
        let response = error_response(
            Some(RequestId::Number(7)),
            JsonRpcError::method_not_found().with_data(serde_json::json!({"method": "nope"})),
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(value["error"]["data"]["method"], "nope");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn success_response_omits_error() {
        let response = success_response(Some(RequestId::Number(1)), serde_json::json!({"ok": true}));
        let text = serde_json::to_string(&response).unwrap();
        assert!(!text.contains("\"error\""));
        assert!(text.contains("\"result\""));
    }
}
