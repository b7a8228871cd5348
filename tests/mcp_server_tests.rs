//! MCP dispatch, over the handler directly and over the HTTP router.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request as HttpRequest, StatusCode},
};
use common::{state_with, RecordingTransport};
use pod_mcp_server::{
    api,
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response, PROTOCOL_VERSION, SERVER_NAME},
    },
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn request(body: Value) -> Request {
    serde_json::from_value(body).unwrap()
}

async fn dispatch(body: Value) -> Option<Response> {
    let state = state_with(RecordingTransport::result(json!("0x50d")));
    handle_mcp_request(request(body), state).await
}

#[tokio::test]
async fn initialize_reports_server_info() {
    let resp = dispatch(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}))
        .await
        .unwrap();
    let result = resp.result.unwrap();
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn tools_list_has_every_explorer_tool() {
    let resp = dispatch(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .await
        .unwrap();
    let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 17);

    let balance = tools
        .iter()
        .find(|t| t["name"] == "eth_getBalance")
        .unwrap();
    let schema = &balance["inputSchema"];
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["version"]["default"], "V1");
    let required: Vec<&str> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(required.contains(&"address"));
    assert!(!required.contains(&"version"));
}

#[tokio::test]
async fn tools_call_wraps_tool_result() {
    let resp = dispatch(json!({
        "jsonrpc": "2.0",
        "id": "abc",
        "method": "tools/call",
        "params": {"name": "eth_chainId", "arguments": {}}
    }))
    .await
    .unwrap();
    assert_eq!(resp.id, json!("abc"));
    assert_eq!(
        resp.result.unwrap(),
        json!({"content": [{"type": "text", "text": "0x50d"}], "isError": false})
    );
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let resp = dispatch(json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {"name": "eth_mine"}
    }))
    .await
    .unwrap();
    let error = resp.error.unwrap();
    assert_eq!(error.code, error_codes::INVALID_PARAMS);
    assert_eq!(error.message, "Tool eth_mine not found");
}

#[tokio::test]
async fn tools_call_without_params_is_invalid_params() {
    let resp = dispatch(json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call"}))
        .await
        .unwrap();
    assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
}

#[tokio::test]
async fn tool_name_as_method_is_a_tools_call() {
    let resp = dispatch(json!({"jsonrpc": "2.0", "id": 5, "method": "eth_chainId"}))
        .await
        .unwrap();
    assert_eq!(resp.result.unwrap()["content"][0]["text"], "0x50d");
}

#[tokio::test]
async fn unknown_method_and_notifications() {
    let resp = dispatch(json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"}))
        .await
        .unwrap();
    assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

    assert!(dispatch(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await
        .is_none());
}

#[tokio::test]
async fn ping_returns_empty_object() {
    let resp = dispatch(json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}))
        .await
        .unwrap();
    assert_eq!(resp.result.unwrap(), json!({}));
}

async fn send(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let app = api::create_router(state_with(RecordingTransport::result(json!("0x50d"))));
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let response = app
        .oneshot(
            HttpRequest::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn http_health_counts_tools() {
    let (status, body) = send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "tools": 17}));
}

#[tokio::test]
async fn http_tools_matches_tools_list() {
    let (status, body) = send(Method::GET, "/api/tools", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tools"].as_array().unwrap().len(), 17);
}

#[tokio::test]
async fn http_rpc_runs_tools_call() {
    let (status, body) = send(
        Method::POST,
        "/api/rpc",
        Some(json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "tools/call",
            "params": {"name": "eth_chainId"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 9);
    assert_eq!(body["result"]["content"][0]["text"], "0x50d");
}

#[tokio::test]
async fn http_rpc_rejects_notifications() {
    let (status, body) = send(
        Method::POST,
        "/api/rpc",
        Some(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], error_codes::INVALID_REQUEST);
}
