//! Tool registry and invocation adapter.
//!
//! `invoke` is the single place where per-tool failures are handled: schema
//! violations, explorer failures and panics inside a tool body all come out
//! as a `ToolResult` with `isError: true`.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::mcp::schema::ToolSchema;
use crate::mcp::tool::{InvocationContext, Tool, ToolError, ToolParams, ToolResult};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateName(String),
    #[error("tool '{tool}' has an invalid schema: {reason}")]
    InvalidSchema { tool: String, reason: String },
    #[error("Tool {0} not found")]
    UnknownTool(String),
}

/// Entry of `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

struct RegisteredTool {
    tool: Arc<dyn Tool>,
    schema: ToolSchema,
}

/// Dispatch table from tool name to tool. Filled at startup, read-only after.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a tool into the dispatch table. The schema is read and checked
    /// once here and reused for every call.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        let schema = tool.schema();
        schema.check().map_err(|reason| RegistryError::InvalidSchema {
            tool: name.clone(),
            reason,
        })?;

        debug!("Registered tool {}", name);
        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool { tool, schema });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tools in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|entry| ToolDescriptor {
                name: entry.tool.name().to_string(),
                description: entry.tool.description().to_string(),
                input_schema: entry.schema.input_schema(),
            })
            .collect()
    }

    /// Validates `arguments`, runs the tool and normalizes the outcome.
    ///
    /// Only an unregistered name is reported as an `Err`; everything that
    /// happens once the tool is found ends up in the returned `ToolResult`.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &InvocationContext,
    ) -> Result<ToolResult, RegistryError> {
        let entry = self
            .index
            .get(name)
            .and_then(|&i| self.tools.get(i))
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;

        let outcome = match entry.schema.validate(arguments) {
            Ok(args) => {
                let params = ToolParams::new(args);
                AssertUnwindSafe(entry.tool.execute(params, ctx))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(ToolError::Unexpected(panic_message(panic))))
            }
            Err(e) => Err(ToolError::from(e)),
        };

        Ok(match outcome {
            Ok(result) => {
                info!("Tool {} completed (request {})", name, ctx.request_id);
                result
            }
            Err(err) => {
                warn!(
                    "Tool {} failed with {} error (request {}): {}",
                    name,
                    err.kind(),
                    ctx.request_id,
                    err
                );
                ToolResult::error(err.to_string())
            }
        })
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
