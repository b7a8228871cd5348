//! Tool contract shared by every explorer tool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::blockchain::client::ExplorerError;
use crate::blockchain::models::RpcError;
use crate::blockchain::timer::TimestampError;
use crate::config::{ConfigError, ProtocolVersion};
use crate::mcp::schema::{ToolSchema, ValidationError};

/// Why an invocation did not produce a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Unexpected(String),
}

impl ToolError {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "validation",
            ToolError::Rpc(RpcError::Transport(_)) => "transport",
            ToolError::Rpc(RpcError::Protocol { .. }) => "protocol",
            ToolError::Rpc(RpcError::Malformed(_)) => "malformed",
            ToolError::Config(_) => "config",
            ToolError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<ExplorerError> for ToolError {
    fn from(err: ExplorerError) -> Self {
        match err {
            ExplorerError::Config(e) => ToolError::Config(e),
            ExplorerError::Rpc(e) => ToolError::Rpc(e),
        }
    }
}

impl ToolError {
    /// Wraps a timestamp parse failure as a validation error on `field`.
    pub fn timestamp(field: &str, err: TimestampError) -> Self {
        ToolError::Validation(ValidationError::Constraint {
            field: field.to_string(),
            reason: format!("is not a valid timestamp ({})", err),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// Result of `tools/call`, in MCP wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Concatenated text of all content blocks.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Per-call information from the host.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// JSON-RPC id of the host request, for log correlation.
    pub request_id: Value,
}

impl InvocationContext {
    pub fn new(request_id: Value) -> Self {
        Self { request_id }
    }
}

/// Arguments after schema validation and defaulting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolParams(Map<String, Value>);

impl ToolParams {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Clone of a value, if present. Handy when forwarding as-is.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.0.get(name).cloned()
    }

    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.opt_str(name)?
            .ok_or_else(|| ToolError::Unexpected(format!("parameter '{}' is missing", name)))
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, ToolError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(mistyped(name, "string")),
        }
    }

    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>, ToolError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(mistyped(name, "boolean")),
        }
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, ToolError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| mistyped(name, "number")),
        }
    }

    pub fn opt_u64(&self, name: &str) -> Result<Option<u64>, ToolError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| mistyped(name, "non-negative integer")),
        }
    }

    /// The protocol version; defaults to V1 when the schema did not declare one.
    pub fn version(&self) -> Result<ProtocolVersion, ToolError> {
        match self.opt_str("version")? {
            Some(tag) => Ok(tag.parse()?),
            None => Ok(ProtocolVersion::default()),
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

fn mistyped(name: &str, expected: &str) -> ToolError {
    ToolError::Unexpected(format!("parameter '{}' is not a {}", name, expected))
}

/// A named, schema-validated remote operation exposed to the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by `tools/call`.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn schema(&self) -> ToolSchema;

    /// Runs the tool with validated params. Failures are returned, never
    /// swallowed; the registry turns them into error results.
    async fn execute(
        &self,
        params: ToolParams,
        ctx: &InvocationContext,
    ) -> Result<ToolResult, ToolError>;
}
