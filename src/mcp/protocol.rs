// src/mcp/protocol.rs

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = "jpyc-sdk";
pub const SERVER_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }

    /// Conversation the call belongs to, taken from MCP `_meta` or a top-level
    /// `conversationId` param.
    pub fn conversation_id(&self) -> Option<String> {
        let params = self.params.as_ref()?;
        params
            .get("_meta")
            .and_then(|m| m.get("conversationId"))
            .or_else(|| params.get("conversationId"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Rewrites a direct method call (`jpyc_balance` with its arguments as
    /// params) into the equivalent `tools/call` request.
    pub fn into_tool_call(self) -> Request {
        let conversation = self.conversation_id();
        let mut arguments = self.params.unwrap_or_else(|| json!({}));
        let meta = arguments
            .as_object_mut()
            .and_then(|map| map.remove("_meta"));
        let mut params = json!({
            "name": self.method,
            "arguments": arguments,
        });
        if let Some(meta) = meta {
            params["_meta"] = meta;
        } else if let Some(id) = conversation {
            params["conversationId"] = json!(id);
        }
        Request {
            jsonrpc: self.jsonrpc,
            id: self.id,
            method: "tools/call".to_string(),
            params: Some(params),
        }
    }
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(ErrorObject { code, message }),
        }
    }
}

// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
}
