// src/main.rs

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use pod_mcp_server::{
    api,
    config::Config,
    mcp::stdio,
    AppState,
};
use tokio::io::{self, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// MCP server exposing the pod network explorer as tools.
#[derive(Debug, Parser)]
#[command(name = "pod_mcp", version, about)]
struct Cli {
    /// Serve JSON-RPC over HTTP instead of MCP over stdin/stdout
    #[arg(long)]
    http: bool,

    /// Port for HTTP mode, overrides PORT
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = api::create_router(state);

    info!("🚀 HTTP Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("HTTP server error")
}

// --- MCP Server Logic ---
async fn run_mcp_server(state: AppState) -> Result<()> {
    info!("🚀 Starting MCP server on stdin/stdout...");
    stdio::serve(BufReader::new(io::stdin()), io::stdout(), state)
        .await
        .context("MCP stdio stream failed")
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the MCP stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pod_mcp_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    let app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Failed to initialize explorer tools: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("Registered {} explorer tools", app_state.registry.len());

    if cli.http {
        if let Err(e) = run_http_server(app_state).await {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    } else if let Err(e) = run_mcp_server(app_state).await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}
