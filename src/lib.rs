// src/lib.rs

use std::sync::Arc;

use anyhow::{Context, Result};

// Re-export modules
pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod utils;

use blockchain::{client::ExplorerClient, services};
use mcp::registry::ToolRegistry;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Every explorer tool, keyed by name
    pub registry: Arc<ToolRegistry>,
}

impl AppState {
    /// Builds the explorer client from `config` and registers every tool.
    pub fn new(config: config::Config) -> Result<Self> {
        let network = config.network_config()?;
        let client = ExplorerClient::http(network, config.request_timeout())?;
        Self::with_client(config, &client)
    }

    /// Same as [`AppState::new`] but with a caller-supplied client, so tests
    /// can swap the transport or the endpoint table.
    pub fn with_client(config: config::Config, client: &ExplorerClient) -> Result<Self> {
        let mut registry = ToolRegistry::new();
        services::register_all(&mut registry, client).context("Failed to register tools")?;
        Ok(Self {
            config,
            registry: Arc::new(registry),
        })
    }
}
