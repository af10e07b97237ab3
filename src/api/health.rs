use axum::{extract::State, response::IntoResponse, Json};

use crate::{mcp::protocol::SERVER_NAME, AppState};

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "server": SERVER_NAME,
        "conversations": state.sessions.conversation_count(),
    }))
}
