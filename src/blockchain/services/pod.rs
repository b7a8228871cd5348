// src/blockchain/services/pod.rs

use serde_json::{json, Map, Value};

use crate::blockchain::client::ExplorerClient;
use crate::blockchain::models::{object, RpcParams};
use crate::blockchain::services::RpcTool;
use crate::blockchain::timer;
use crate::config::NetworkConfig;
use crate::mcp::schema::{ParamField, ToolSchema};
use crate::mcp::tool::{ToolError, ToolParams};

pub fn get_committee(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "pod_getCommittee",
        "Lists the validator public keys that are part of the committee.",
    )
    .with_schema(
        ToolSchema::new()
            .field(
                "quorum_size",
                ParamField::number("Number of required attestations").optional(),
            )
            .field(
                "validators",
                ParamField::string_array("List of validator public keys").optional(),
            )
            .field("version", ParamField::version()),
    )
    .with_params(|p, _| {
        Ok(RpcParams::named([
            ("quorum_size", p.value("quorum_size")),
            ("validators", p.value("validators")),
        ]))
    })
    .render_json()
}

pub fn metrics(client: ExplorerClient) -> RpcTool {
    RpcTool::new(client, "pod_metrics", "Retrieve metrics from explorer.")
        .with_schema(
            ToolSchema::new()
                .field(
                    "gas_price",
                    ParamField::number("Current gas price in wei (value type u128)").optional(),
                )
                .field(
                    "validator_uptime",
                    ParamField::number("Validator uptime percentage (value type f64)").optional(),
                )
                .field(
                    "latency",
                    ParamField::number("Average latency in milliseconds (value type f64)")
                        .optional(),
                )
                .field(
                    "throughput",
                    ParamField::number(
                        "Average throughput in transactions per second (value type f64)",
                    )
                    .optional(),
                )
                .field("version", ParamField::version()),
        )
        .with_params(|p, _| {
            Ok(RpcParams::named(
                ["gas_price", "validator_uptime", "latency", "throughput"]
                    .into_iter()
                    .map(|key| (key, p.value(key))),
            ))
        })
        .render_json()
}

pub fn list_account_receipts(client: ExplorerClient) -> RpcTool {
    RpcTool::new(client, "pod_listAccountReceipts", "List account receipts")
        .with_schema(
            ToolSchema::new()
                .field("address", ParamField::string("20-byte address"))
                .field(
                    "since",
                    ParamField::string(
                        "Timestamp specified in microseconds representing the start of the range to query",
                    ),
                )
                .field(
                    "cursor",
                    ParamField::string("(optional) Cursor to start the query from.").optional(),
                )
                .field(
                    "limit",
                    ParamField::integer("(optional) Maximum number of receipts to return.")
                        .optional()
                        .minimum(1.0),
                )
                .field(
                    "newest_first",
                    ParamField::boolean(
                        "(optional) Whether to start the query from the most recent receipts. \
                         Note: If cursor is provided, newest_first must NOT be provided.",
                    )
                    .with_default(json!(true)),
                )
                .field("version", ParamField::version()),
        )
        .with_params(|p, _| {
            let address = p.str("address")?;
            let since = p.str("since")?;
            let newest_first = p.opt_bool("newest_first")?.unwrap_or(true);
            let mut params = Map::new();
            params.insert("address".into(), json!(address));
            params.insert("since".into(), json!(since));
            params.insert("pagination".into(), pagination(p, newest_first)?);
            Ok(RpcParams::Named(params))
        })
        .render_json()
}

pub fn list_confirmed_receipts(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "pod_listConfirmedReceipts",
        "Retrieve list of confirm receipts from explorer.",
    )
    .with_schema(
        ToolSchema::new()
            .field("version", ParamField::version())
            .field(
                "since",
                ParamField::string(
                    "ISO string representing the start of the range to query. \
                     The value should not be after current time.",
                )
                .min_length(1),
            )
            .field(
                "cursor",
                ParamField::string(
                    "Cursor for pagination. If provided, the query will start from the cursor.",
                )
                .optional(),
            )
            .field(
                "limit",
                ParamField::integer(
                    "Limit for pagination. Because result value usually large, it is recommended \
                     to set limit to a small value. When asking first or last receipt, should put \
                     limit to 1 as possible.",
                )
                .optional()
                .minimum(1.0),
            )
            .field(
                "newest_first",
                ParamField::boolean(
                    "Sort by newest first. Note: if cursor is provided, this parameter will be ignored.",
                )
                .optional(),
            ),
    )
    .with_params(|p, network| {
        let since = since_micros(p.str("since")?, network)?;
        let newest_first = p.opt_bool("newest_first")?.unwrap_or(false);
        let mut params = Map::new();
        params.insert("since".into(), json!(since));
        params.insert("pagination".into(), pagination(p, newest_first)?);
        Ok(RpcParams::Named(params))
    })
    .render_json()
}

/// Floors an ISO instant at network launch and converts it to microseconds.
fn since_micros(iso: &str, network: &NetworkConfig) -> Result<i64, ToolError> {
    let instant = timer::parse_iso(iso).map_err(|e| ToolError::timestamp("since", e))?;
    Ok(timer::floor_instant(instant, network.launch_timestamp()).timestamp_micros())
}

/// `newest_first` is only sent when paging from the start; the explorer
/// rejects it next to a cursor.
fn pagination(p: &ToolParams, newest_first: bool) -> Result<Value, ToolError> {
    let cursor = p.opt_str("cursor")?;
    let limit = p.opt_u64("limit")?.map(NetworkConfig::clamp_page_size);
    let newest_first = match cursor {
        Some(c) if !c.is_empty() => None,
        _ => Some(json!(newest_first)),
    };
    Ok(Value::Object(object([
        ("cursor", cursor.map(|c| json!(c))),
        ("limit", limit.map(|l| json!(l))),
        ("newest_first", newest_first),
    ])))
}
