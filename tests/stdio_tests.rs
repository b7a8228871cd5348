//! The stdio host, driven through in-memory pipes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{state_with, RecordingTransport};
use pod_mcp_server::mcp::{protocol::error_codes, stdio};
use serde_json::{json, Value};
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;

/// Feeds `input` to a server backed by `transport`, closes stdin and
/// collects every output line.
async fn run(transport: Arc<RecordingTransport>, input: &[u8]) -> Vec<Value> {
    let (mut client_in, server_in) = duplex(64 * 1024);
    let (server_out, client_out) = duplex(64 * 1024);

    let server = tokio::spawn(stdio::serve(
        BufReader::new(server_in),
        server_out,
        state_with(transport),
    ));

    client_in.write_all(input).await.unwrap();
    drop(client_in);

    let mut lines = BufReader::new(client_out).lines();
    let mut out = Vec::new();
    while let Some(line) = timeout(Duration::from_secs(5), lines.next_line())
        .await
        .unwrap()
        .unwrap()
    {
        out.push(serde_json::from_str(&line).unwrap());
    }

    server.await.unwrap().unwrap();
    out
}

#[tokio::test]
async fn garbage_line_gets_parse_error_and_server_keeps_going() {
    let out = run(
        RecordingTransport::result(json!("0x50d")),
        b"not json at all\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
    )
    .await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(out[0]["id"], Value::Null);
    assert_eq!(out[1], json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
}

#[tokio::test]
async fn invalid_utf8_line_does_not_stop_the_server() {
    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\n");

    let out = run(RecordingTransport::result(json!("0x50d")), &input).await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(out[1]["id"], 7);
    assert_eq!(out[1]["result"], json!({}));
}

#[tokio::test]
async fn notifications_and_blank_lines_produce_no_output() {
    let out = run(
        RecordingTransport::result(json!("0x50d")),
        b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n\n   \n\
          {\"jsonrpc\":\"2.0\",\"id\":\"last\",\"method\":\"tools/call\",\"params\":{\"name\":\"eth_chainId\"}}\n",
    )
    .await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["id"], "last");
    assert_eq!(out[0]["result"]["content"][0]["text"], "0x50d");
}

#[tokio::test]
async fn final_line_without_newline_is_served() {
    let out = run(
        RecordingTransport::result(json!("0x50d")),
        b"{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}",
    )
    .await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["id"], 3);
}

#[tokio::test]
async fn slow_call_does_not_block_later_requests() {
    let transport = RecordingTransport::slow(json!("0x50d"), Duration::from_millis(500));
    let (mut client_in, server_in) = duplex(64 * 1024);
    let (server_out, client_out) = duplex(64 * 1024);
    let server = tokio::spawn(stdio::serve(
        BufReader::new(server_in),
        server_out,
        state_with(transport.clone()),
    ));

    client_in
        .write_all(
            b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/call\",\"params\":{\"name\":\"eth_chainId\"}}\n\
              {\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        )
        .await
        .unwrap();

    let mut lines = BufReader::new(client_out).lines();

    // The ping answer arrives while the explorer call is still pending.
    let first = timeout(Duration::from_millis(400), lines.next_line())
        .await
        .expect("ping should not wait for the explorer")
        .unwrap()
        .unwrap();
    let first: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(first["id"], 2);

    let second = timeout(Duration::from_secs(5), lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let second: Value = serde_json::from_str(&second).unwrap();
    assert_eq!(second["id"], 1);
    assert_eq!(second["result"]["content"][0]["text"], "0x50d");
    assert_eq!(transport.calls().len(), 1);

    drop(client_in);
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn eof_waits_for_in_flight_requests() {
    let out = run(
        RecordingTransport::slow(json!("0x1"), Duration::from_millis(100)),
        b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"eth_blockNumber\"}\n",
    )
    .await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["result"]["content"][0]["text"], "0x1");
}
