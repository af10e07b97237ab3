use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::{
    api::conversation_id,
    blockchain::{chains::display_name_for, models::TokenError, to_checksum, Chain},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SwitchChainRequest {
    pub chain: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOutput {
    pub success: bool,
    pub chain: Chain,
    pub chain_name: &'static str,
    /// Whether clients for `chain` have been built yet.
    pub bound: bool,
}

fn failure(status: StatusCode, err: TokenError) -> axum::response::Response {
    (status, Json(json!({ "success": false, "error": err.to_string() }))).into_response()
}

// GET /chain
pub async fn get_chain_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = state.sessions.lookup(conversation_id(&headers));
    let chain = session.current_chain();
    Json(ChainOutput {
        success: true,
        chain,
        chain_name: chain.display_name(),
        bound: session.is_bound(),
    })
}

// POST /chain
pub async fn switch_chain_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SwitchChainRequest>,
) -> impl IntoResponse {
    let target = payload.chain.trim();
    // Reject unknown chains before a conversation gets registered for them.
    let chain_name = match display_name_for(target) {
        Ok(name) => name,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e),
    };
    let session = state.sessions.session(conversation_id(&headers));
    match session.switch_chain_by_name(target) {
        Ok(switched) => Json(ChainOutput {
            success: true,
            chain: switched.current,
            chain_name,
            bound: session.is_bound(),
        })
        .into_response(),
        Err(e @ TokenError::UnsupportedChain { .. }) => failure(StatusCode::BAD_REQUEST, e),
        Err(e) => {
            error!("Failed to switch chain: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

// GET /address
pub async fn get_address_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = state.sessions.lookup(conversation_id(&headers));
    match session.current_address() {
        Ok(address) => Json(json!({
            "success": true,
            "address": to_checksum(&address, None),
        }))
        .into_response(),
        Err(e) => {
            error!("Failed to derive wallet address: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
