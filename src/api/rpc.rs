use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::json;

use crate::{
    api::conversation_id,
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};

// Forward JSON-RPC requests over HTTP to the MCP handler
pub async fn rpc_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut req): Json<Request>,
) -> Json<Response> {
    // The header names the conversation unless the request already does.
    if let Some(id) = conversation_id(&headers) {
        if req.conversation_id().is_none() {
            let params = req.params.get_or_insert_with(|| json!({}));
            if let Some(map) = params.as_object_mut() {
                let meta = map.entry("_meta").or_insert_with(|| json!({}));
                if let Some(meta) = meta.as_object_mut() {
                    meta.insert("conversationId".into(), json!(id));
                }
            }
        }
    }

    match handle_mcp_request(req, state).await {
        Some(resp) => Json(resp),
        None => Json(Response::error(
            serde_json::Value::Null,
            error_codes::INVALID_REQUEST,
            "Notifications are not supported over HTTP".into(),
        )),
    }
}
