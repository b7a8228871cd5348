// src/blockchain/models.rs
//! JSON-RPC 2.0 envelopes exchanged with the explorer, and the rules for
//! classifying what comes back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// One call is in flight per invocation, so the id never needs to correlate.
pub const REQUEST_ID: u64 = 1;

// --- Error types for explorer calls ---

/// The outbound call failed before a JSON body was available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    /// The call never produced a usable body (connection, timeout, non-JSON).
    #[error("{0}")]
    Transport(String),
    /// The explorer answered with a JSON-RPC error envelope.
    #[error("{message}")]
    Protocol {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    /// The body was JSON but not a valid response envelope.
    #[error("malformed JSON-RPC response: {0}")]
    Malformed(String),
}

// --- Request ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcParams {
    Positional(Vec<Value>),
    Named(Map<String, Value>),
}

impl RpcParams {
    pub fn empty() -> Self {
        RpcParams::Positional(Vec::new())
    }

    /// Positional params; `None` entries are dropped, the rest keep their order.
    pub fn positional<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        RpcParams::Positional(values.into_iter().flatten().collect())
    }

    /// Keyed params; keys whose value is `None` are omitted.
    pub fn named<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<Value>)>,
    {
        RpcParams::Named(object(entries))
    }
}

/// Builds a JSON object, skipping absent values.
pub fn object<'a, I>(entries: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a str, Option<Value>)>,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: RpcParams,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: RpcParams) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: REQUEST_ID,
        }
    }
}

// --- Response ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    /// Some upstreams omit the code; the message is still surfaced.
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Classifies the outcome of one explorer call.
///
/// Precedence: a transport failure wins; a body carrying both `error` and
/// `result` is malformed; a non-null `error` is a protocol error; otherwise the
/// `result` member is the payload. A `null` result is a valid payload.
pub fn interpret_response(raw: Result<Value, TransportError>) -> Result<Value, RpcError> {
    let body = raw.map_err(|e| RpcError::Transport(e.0))?;

    let mut envelope = match body {
        Value::Object(map) => map,
        other => {
            return Err(RpcError::Malformed(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )))
        }
    };

    let error = envelope.remove("error").filter(|e| !e.is_null());
    let result = envelope.remove("result");

    match (error, result) {
        (Some(_), Some(_)) => Err(RpcError::Malformed(
            "response carries both 'result' and 'error'".to_string(),
        )),
        (Some(error), None) => match serde_json::from_value::<RpcErrorObject>(error) {
            Ok(err) => Err(RpcError::Protocol {
                code: err.code,
                message: err.message,
                data: err.data,
            }),
            Err(e) => Err(RpcError::Malformed(format!("invalid 'error' member: {}", e))),
        },
        (None, Some(result)) => Ok(result),
        (None, None) => Err(RpcError::Malformed(
            "response carries neither 'result' nor 'error'".to_string(),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
