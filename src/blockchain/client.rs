//! Explorer client for the pod network.
//!
//! Every tool funnels its single upstream call through [`ExplorerClient::call`]:
//! resolve the endpoint for the requested protocol version, POST one JSON-RPC
//! envelope, and classify whatever comes back.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::blockchain::models::{interpret_response, RpcError, RpcParams, RpcRequest, TransportError};
use crate::config::{ConfigError, NetworkConfig, ProtocolVersion};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Delivers one request envelope to an endpoint and hands back the decoded
/// JSON body. Implementations must not interpret the envelope.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn post(&self, endpoint: &Url, request: &RpcRequest) -> Result<Value, TransportError>;
}

/// reqwest-backed transport used in production.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn post(&self, endpoint: &Url, request: &RpcRequest) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError(error_chain(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(error_chain(&e)))?;

        // Non-2xx bodies are still classified when they carry a JSON-RPC envelope.
        serde_json::from_str::<Value>(&body).map_err(|e| {
            TransportError(format!(
                "explorer returned HTTP {} with a non-JSON body: {}",
                status, e
            ))
        })
    }
}

/// Joins an error with its sources; reqwest keeps the useful part
/// (connection refused, timed out) in the chain.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Client for the explorer JSON-RPC API, shared by all tools.
#[derive(Clone)]
pub struct ExplorerClient {
    network: Arc<NetworkConfig>,
    transport: Arc<dyn RpcTransport>,
}

impl ExplorerClient {
    pub fn new(network: NetworkConfig, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            network: Arc::new(network),
            transport,
        }
    }

    /// Create a client that talks HTTP with the given request timeout.
    pub fn http(network: NetworkConfig, timeout: Duration) -> Result<Self> {
        Ok(Self::new(network, Arc::new(HttpTransport::new(timeout)?)))
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Performs exactly one upstream call and returns the `result` payload.
    pub async fn call(
        &self,
        version: ProtocolVersion,
        method: &str,
        params: RpcParams,
    ) -> Result<Value, ExplorerError> {
        let endpoint = self.network.resolve_endpoint(version)?;
        let request = RpcRequest::new(method, params);
        debug!("Calling {} on {} ({})", method, endpoint, version);

        let raw = self.transport.post(endpoint, &request).await;
        Ok(interpret_response(raw)?)
    }
}

impl std::fmt::Debug for ExplorerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
