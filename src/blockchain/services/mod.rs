//! # Explorer tools
//!
//! Every tool exposed over MCP is an [`RpcTool`]: a parameter schema, an
//! upstream JSON-RPC method, a function that reshapes validated arguments into
//! that method's params, and a rendering rule for the result.
//!
//! ## Ethereum-compatible methods (`eth.rs`)
//! - `eth_blockNumber`, `eth_chainId`, `eth_gasPrice`, `eth_networkId`
//! - `eth_estimateGas`, `eth_getBalance`, `eth_getTransactionCount`
//! - `eth_getBlockByHash`, `eth_getBlockByNumber`, `eth_getLogs`
//! - `eth_getTransactionByHash`, `eth_getTransactionReceipt`
//! - `eth_sendRawTransaction`
//!
//! ## pod-specific methods (`pod.rs`)
//! - `pod_getCommittee`, `pod_metrics`
//! - `pod_listAccountReceipts`, `pod_listConfirmedReceipts`

pub mod eth;
pub mod pod;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::blockchain::client::ExplorerClient;
use crate::blockchain::models::RpcParams;
use crate::config::NetworkConfig;
use crate::mcp::registry::{RegistryError, ToolRegistry};
use crate::mcp::schema::{ParamField, ToolSchema};
use crate::mcp::tool::{InvocationContext, Tool, ToolError, ToolParams, ToolResult};

/// Reshapes validated tool arguments into upstream params.
pub type BuildParams = fn(&ToolParams, &NetworkConfig) -> Result<RpcParams, ToolError>;

/// How the upstream `result` becomes the text content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// Strings verbatim, anything else as JSON.
    Plain,
    /// Always JSON.
    Json,
}

impl Render {
    pub fn render(self, result: &Value) -> Result<String, ToolError> {
        match (self, result) {
            (Render::Plain, Value::String(s)) => Ok(s.clone()),
            _ => serde_json::to_string(result)
                .map_err(|e| ToolError::Unexpected(format!("failed to serialize result: {}", e))),
        }
    }
}

/// A tool that forwards one call to the explorer.
pub struct RpcTool {
    name: &'static str,
    description: &'static str,
    method: &'static str,
    schema: ToolSchema,
    build_params: BuildParams,
    render: Render,
    client: ExplorerClient,
}

impl RpcTool {
    /// A parameterless tool named after its upstream method. Only `version`
    /// is declared until [`RpcTool::with_schema`] says otherwise.
    pub fn new(client: ExplorerClient, method: &'static str, description: &'static str) -> Self {
        Self {
            name: method,
            description,
            method,
            schema: ToolSchema::new().field("version", ParamField::version()),
            build_params: |_, _| Ok(RpcParams::empty()),
            render: Render::Plain,
            client,
        }
    }

    pub fn with_schema(mut self, schema: ToolSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_params(mut self, build_params: BuildParams) -> Self {
        self.build_params = build_params;
        self
    }

    pub fn render_json(mut self) -> Self {
        self.render = Render::Json;
        self
    }

    pub fn method(&self) -> &str {
        self.method
    }

    /// Upstream params for `params`, without calling anything.
    pub fn build_params(&self, params: &ToolParams) -> Result<RpcParams, ToolError> {
        (self.build_params)(params, self.client.network())
    }
}

#[async_trait]
impl Tool for RpcTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    async fn execute(
        &self,
        params: ToolParams,
        ctx: &InvocationContext,
    ) -> Result<ToolResult, ToolError> {
        let version = params.version()?;
        let rpc_params = self.build_params(&params)?;
        debug!("{} (request {}) -> {}", self.name, ctx.request_id, self.method);

        let result = self.client.call(version, self.method, rpc_params).await?;
        Ok(ToolResult::text(self.render.render(&result)?))
    }
}

/// Every explorer tool, in the order they are listed to the host.
pub fn all_tools(client: &ExplorerClient) -> Vec<RpcTool> {
    vec![
        pod::list_confirmed_receipts(client.clone()),
        pod::metrics(client.clone()),
        pod::get_committee(client.clone()),
        eth::get_balance(client.clone()),
        pod::list_account_receipts(client.clone()),
        eth::get_transaction_count(client.clone()),
        eth::block_number(client.clone()),
        eth::chain_id(client.clone()),
        eth::estimate_gas(client.clone()),
        eth::gas_price(client.clone()),
        eth::get_block_by_hash(client.clone()),
        eth::get_block_by_number(client.clone()),
        eth::get_logs(client.clone()),
        eth::get_transaction_by_hash(client.clone()),
        eth::get_transaction_receipt(client.clone()),
        eth::send_raw_transaction(client.clone()),
        eth::network_id(client.clone()),
    ]
}

/// Registers every explorer tool.
pub fn register_all(registry: &mut ToolRegistry, client: &ExplorerClient) -> Result<(), RegistryError> {
    for tool in all_tools(client) {
        registry.register(Arc::new(tool))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_render_keeps_strings_raw() {
        assert_eq!(Render::Plain.render(&json!("0x4d2")).unwrap(), "0x4d2");
        assert_eq!(Render::Plain.render(&json!({"a": 1})).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn json_render_quotes_strings() {
        assert_eq!(Render::Json.render(&json!("0x4d2")).unwrap(), "\"0x4d2\"");
        assert_eq!(Render::Json.render(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn tool_names_are_unique() {
        let client = ExplorerClient::http(NetworkConfig::devnet(), std::time::Duration::from_secs(1))
            .unwrap();
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, &client).unwrap();
        assert_eq!(registry.len(), 17);
    }
}
