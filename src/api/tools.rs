use axum::{extract::State, Json};

use crate::{mcp::protocol::ToolsListResult, AppState};

/// Same payload as MCP `tools/list`, for browsing the catalogue over HTTP.
pub async fn list_tools_handler(State(state): State<AppState>) -> Json<ToolsListResult> {
    Json(ToolsListResult {
        tools: state.registry.descriptors(),
    })
}
