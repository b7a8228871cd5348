//! # API Module
//!
//! HTTP surface of the server, used when it runs with `--http` instead of
//! MCP over stdio.
//!
//! ## Available Endpoints
//! - `GET /api/health` - Liveness and number of registered tools
//! - `GET /api/tools` - Tool catalogue, same shape as MCP `tools/list`
//! - `POST /api/rpc` - MCP JSON-RPC requests (`tools/call` etc.) over HTTP

pub mod health;
pub mod rpc;
pub mod tools;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Builds the full router, with every route nested under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/tools", get(tools::list_tools_handler))
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
