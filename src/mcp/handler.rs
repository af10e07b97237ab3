//! # MCP Handler Module
//!
//! Implements the Model Context Protocol methods the JPYC server answers and
//! dispatches `tools/call` requests to the tools in [`crate::mcp::tools`].
//!
//! ## Supported Tools
//! - `jpyc_balance` - JPYC balance of an address (defaults to the server wallet)
//! - `jpyc_transfer` - Send JPYC from the server wallet
//! - `jpyc_switch_chain` - Select sepolia, amoy or fuji
//! - `jpyc_get_current_chain` - Selected chain and wallet address
//! - `jpyc_total_supply` - Total JPYC supply on the selected chain
//!
//! Tool names are also accepted as direct JSON-RPC methods.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    blockchain::Chain,
    mcp::{
        protocol::{error_codes, Request, Response, PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION},
        tools::{self, Tool},
    },
    AppState,
};

// Tool results carry both the structured record and a text rendering of it.
fn make_texty_result(payload: Value) -> Value {
    let text = serde_json::to_string(&payload).unwrap_or_default();
    let content = json!([{ "type": "text", "text": text }]);
    match payload {
        Value::Object(mut map) => {
            map.insert("content".into(), content);
            Value::Object(map)
        }
        other => json!({ "data": other, "content": content }),
    }
}

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        debug!("Ignoring notification {}", req.method);
        return None;
    }

    let method = req.method.clone();
    let response = match method.as_str() {
        "initialize" => handle_initialize(&req),
        "ping" => Response::success(req.id, json!({})),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, &state).await,
        name if Tool::from_name(name).is_some() => {
            handle_tool_call(req.into_tool_call(), &state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool.
async fn handle_tool_call(req: Request, state: &AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let tool = match Tool::from_name(tool_name) {
        Some(tool) => tool,
        None => {
            return Response::error(
                req.id.clone(),
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", tool_name),
            )
        }
    };

    let empty_args = json!({});
    let args = params
        .get("arguments")
        .filter(|a| !a.is_null())
        .unwrap_or(&empty_args);
    let conversation_id = req.conversation_id();
    // Only a switch to a supported chain registers the conversation.
    let registers = tool == Tool::SwitchChain
        && args
            .get("chain")
            .and_then(Value::as_str)
            .map_or(false, |c| c.parse::<Chain>().is_ok());
    let session = if registers {
        state.sessions.session(conversation_id.as_deref())
    } else {
        state.sessions.lookup(conversation_id.as_deref())
    };

    let record = tools::execute(tool, &session, &state.config.token, args).await;
    Response::success(req.id.clone(), make_texty_result(record))
}

fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions = "JPYC stablecoin tools for the Ethereum Sepolia, Polygon Amoy and Avalanche Fuji testnets: balance, transfer, total supply and chain switching.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning the definition of every tool.
fn handle_tools_list(req: &Request) -> Response {
    let tools: Vec<Value> = Tool::ALL.iter().map(Tool::definition).collect();
    Response::success(req.id.clone(), json!({ "tools": tools }))
}
