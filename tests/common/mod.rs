//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pod_mcp_server::{
    blockchain::{
        client::{ExplorerClient, RpcTransport},
        models::{RpcRequest, TransportError},
    },
    config::{Config, NetworkConfig},
    AppState,
};
use serde_json::{json, Value};
use url::Url;

/// Transport that records every envelope and answers with a canned body.
pub struct RecordingTransport {
    reply: Result<Value, TransportError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(Url, RpcRequest)>>,
}

impl RecordingTransport {
    pub fn replying(body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(body),
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn result(result: Value) -> Arc<Self> {
        Self::replying(json!({"jsonrpc": "2.0", "result": result, "id": 1}))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(TransportError(message.to_string())),
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answers with `result` only after `delay`.
    pub fn slow(result: Value, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(json!({"jsonrpc": "2.0", "result": result, "id": 1})),
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Url, RpcRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcTransport for RecordingTransport {
    async fn post(&self, endpoint: &Url, request: &RpcRequest) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.clone(), request.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

pub fn client_with(transport: Arc<RecordingTransport>) -> ExplorerClient {
    ExplorerClient::new(NetworkConfig::devnet(), transport)
}

pub fn state_with(transport: Arc<RecordingTransport>) -> AppState {
    AppState::with_client(Config::default(), &client_with(transport)).unwrap()
}
