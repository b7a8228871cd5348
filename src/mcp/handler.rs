//! # MCP Handler Module
//!
//! This module implements the Model Context Protocol (MCP) for the pod
//! explorer server. It handles incoming MCP requests and dispatches
//! `tools/call` to the [`ToolRegistry`](crate::mcp::registry::ToolRegistry).
//!
//! ## Supported Methods
//! - `initialize` - Server info and capabilities
//! - `ping` - Liveness check
//! - `tools/list` - Every registered tool with its input schema
//! - `tools/call` - Validate and run one tool
//!
//! A request whose method is itself a registered tool name (e.g.
//! `eth_chainId`) is treated as a `tools/call` with `params` as arguments,
//! for CLI convenience.

use serde_json::json;
use tracing::{error, info};

use crate::{
    mcp::{
        protocol::{
            error_codes, InitializeResult, Request, Response, ServerInfo, ToolsCallParams,
            ToolsListResult, PROTOCOL_VERSION, SERVER_NAME,
        },
        registry::RegistryError,
        tool::InvocationContext,
    },
    utils, AppState,
};

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let method = req.method.clone();
    let response = match method.as_str() {
        "initialize" => handle_initialize(&req),
        "ping" => Response::success(req.id, json!({})),
        "tools/list" => handle_tools_list(&req, &state),
        "tools/call" => handle_tool_call(req, &state).await,
        name if state.registry.contains(name) => {
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": name,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, &state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by handing it to the registry.
async fn handle_tool_call(req: Request, state: &AppState) -> Response {
    let res: Result<Response, Response> = (async {
        let params: ToolsCallParams =
            utils::get_required_params(req.params.as_ref(), "tools/call", &req.id)?;
        let ctx = InvocationContext::new(req.id.clone());

        let result = state
            .registry
            .invoke(&params.name, &params.arguments, &ctx)
            .await
            .map_err(|e| match e {
                RegistryError::UnknownTool(_) => {
                    Response::error(req.id.clone(), error_codes::INVALID_PARAMS, e.to_string())
                }
                other => {
                    error!("Registry failure: {}", other);
                    Response::error(req.id.clone(), error_codes::INTERNAL_ERROR, other.to_string())
                }
            })?;

        Ok(Response::success(
            req.id.clone(),
            utils::to_result_value(&result, &req.id)?,
        ))
    })
    .await;
    res.unwrap_or_else(|err_resp| err_resp)
}

fn handle_initialize(req: &Request) -> Response {
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: json!({ "tools": { "listChanged": false } }),
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        instructions: Some(
            "pod network explorer MCP server: read chain state, receipts, committee and metrics, \
             and broadcast pre-signed transactions."
                .to_string(),
        ),
    };

    match utils::to_result_value(&result, &req.id) {
        Ok(value) => Response::success(req.id.clone(), value),
        Err(err_resp) => err_resp,
    }
}

/// Handles the 'tools/list' request by returning every registered tool.
fn handle_tools_list(req: &Request, state: &AppState) -> Response {
    let result = ToolsListResult {
        tools: state.registry.descriptors(),
    };
    match utils::to_result_value(&result, &req.id) {
        Ok(value) => Response::success(req.id.clone(), value),
        Err(err_resp) => err_resp,
    }
}
