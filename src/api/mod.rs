//! # API Module
//!
//! HTTP surface of the JPYC server. Every route reads or changes the chain
//! session of the conversation named by the `x-conversation-id` header, or the
//! shared default session when the header is absent.
//!
//! ## Available Endpoints
//! - `GET /health` - Liveness probe
//! - `GET /chain` - Selected chain and its display name
//! - `POST /chain` - Switch the selected chain (`{"chain": "amoy"}`)
//! - `GET /address` - Checksummed address of the server wallet
//! - `POST /rpc` - JSON-RPC endpoint for MCP requests

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub mod chain;
pub mod health;
pub mod rpc;

pub const CONVERSATION_HEADER: &str = "x-conversation-id";

pub(crate) fn conversation_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONVERSATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Full application router with every route nested under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/chain",
            get(chain::get_chain_handler).post(chain::switch_chain_handler),
        )
        .route("/address", get(chain::get_address_handler))
        // JSON-RPC endpoint for MCP tool calls
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
