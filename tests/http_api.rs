mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{test_state, test_state_with_key, TEST_ADDRESS};
use jpyc_mcp_server::{api::create_router, config::Config, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn create_test_app() -> Router {
    let (state, _) = test_state();
    create_router(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_and_switch_chain() {
    let app = create_test_app();

    let (status, body) = send(&app, get("/api/chain")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "chain": "sepolia", "chainName": "Ethereum Sepolia", "bound": false})
    );

    let (status, body) = send(&app, post_json("/api/chain", json!({"chain": "amoy"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "amoy");
    assert_eq!(body["chainName"], "Polygon Amoy");
    assert_eq!(body["bound"], true);

    let (_, body) = send(&app, get("/api/chain")).await;
    assert_eq!(body["chain"], "amoy");
}

#[tokio::test]
async fn test_switch_to_unknown_chain_is_rejected() {
    let app = create_test_app();
    let (status, body) = send(&app, post_json("/api/chain", json!({"chain": "goerli"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("goerli"));
}

#[tokio::test]
async fn test_conversation_header_selects_session() {
    let app = create_test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/chain")
        .header("content-type", "application/json")
        .header("x-conversation-id", "bob")
        .body(Body::from(json!({"chain": "fuji"}).to_string()))
        .unwrap();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["chain"], "fuji");

    let req = Request::builder()
        .uri("/api/chain")
        .header("x-conversation-id", "bob")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["chain"], "fuji");

    let (_, body) = send(&app, get("/api/chain")).await;
    assert_eq!(body["chain"], "sepolia");
}

#[tokio::test]
async fn test_address() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/address")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], TEST_ADDRESS);

    let (state, _) = test_state_with_key(None);
    let app = create_router(state);
    let (status, body) = send(&app, get("/api/address")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("PRIVATE_KEY"));
}

#[tokio::test]
async fn test_rpc_endpoint() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/rpc",
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
                   "params": {"name": "jpyc_get_current_chain", "arguments": {}}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["chain"], "sepolia");
    assert_eq!(body["result"]["success"], true);

    let (_, body) = send(
        &app,
        post_json("/api/rpc", json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
    )
    .await;
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn test_rpc_uses_conversation_header() {
    let app = create_test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/rpc")
        .header("content-type", "application/json")
        .header("x-conversation-id", "carol")
        .body(Body::from(
            json!({"jsonrpc": "2.0", "id": 2, "method": "jpyc_switch_chain", "params": {"chain": "fuji"}})
                .to_string(),
        ))
        .unwrap();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["result"]["newChain"], "fuji");

    let (_, body) = send(&app, get("/api/chain")).await;
    assert_eq!(body["chain"], "sepolia");
}

fn chain_request(method: &str, conversation: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri("/api/chain")
        .header("x-conversation-id", conversation);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_reads_do_not_register_conversations() {
    let (state, _) = test_state();
    let app = create_router(state.clone());
    for i in 0..500 {
        let (status, body) = send(&app, chain_request("GET", &format!("reader-{}", i), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chain"], "sepolia");
    }
    let (_, body) = send(&app, chain_request("GET", "reader-0", None)).await;
    assert_eq!(body["chain"], "sepolia");
    let (status, _) = send(
        &app,
        chain_request("POST", "typo", Some(json!({"chain": "mainnet"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.sessions.conversation_count(), 0);

    let (_, body) = send(&app, get("/api/health")).await;
    assert_eq!(body["conversations"], 0);
}

#[tokio::test]
async fn test_registered_conversations_are_capped() {
    let (state, ledger) = test_state();
    let config = Config {
        max_sessions: 3,
        ..state.config.clone()
    };
    let state = AppState::new(config, std::sync::Arc::new(common::FakeConnector(ledger)));
    let app = create_router(state.clone());

    for i in 0..20 {
        let (status, _) = send(
            &app,
            chain_request("POST", &format!("writer-{}", i), Some(json!({"chain": "fuji"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(state.sessions.conversation_count(), 3);

    // The most recent writer kept its selection; the first one was evicted.
    let (_, body) = send(&app, chain_request("GET", "writer-19", None)).await;
    assert_eq!(body["chain"], "fuji");
    let (_, body) = send(&app, chain_request("GET", "writer-0", None)).await;
    assert_eq!(body["chain"], "sepolia");
}
