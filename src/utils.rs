//! Utility functions for the pod MCP server

use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::mcp::protocol::{error_codes, Response};

/// Helper function to decode the `params` member of a request into `T`,
/// mapping failures to an `INVALID_PARAMS` response for `req_id`.
pub fn get_required_params<T: DeserializeOwned>(
    params: Option<&Value>,
    method: &str,
    req_id: &Value,
) -> Result<T, Response> {
    let params = params.ok_or_else(|| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("{} requires params", method),
        )
    })?;
    from_value(params.clone()).map_err(|e| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Invalid {} params: {}", method, e),
        )
    })
}

/// Helper function to serialize a result payload, mapping failures to an
/// `INTERNAL_ERROR` response.
pub fn to_result_value<T: serde::Serialize>(value: &T, req_id: &Value) -> Result<Value, Response> {
    serde_json::to_value(value).map_err(|e| {
        Response::error(req_id.clone(), error_codes::INTERNAL_ERROR, e.to_string())
    })
}
