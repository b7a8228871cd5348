// src/blockchain/services/eth.rs

use serde_json::{json, Value};

use crate::blockchain::client::ExplorerClient;
use crate::blockchain::models::{object, RpcParams};
use crate::blockchain::services::RpcTool;
use crate::mcp::schema::{ParamField, ToolSchema};

const PERFECT_TIMESTAMP: &str = "Past perfect timestamp to query, specified in seconds (hexadecimal format). \
Can also be the tags: earliest, finalized or latest.";

const FULL_TRANSACTION: &str = "If true, return the full transaction objects";

pub fn block_number(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_blockNumber",
        "Returns the latest past perfection pod timestamp in microseconds.",
    )
}

pub fn chain_id(client: ExplorerClient) -> RpcTool {
    RpcTool::new(client, "eth_chainId", "Returns the chain ID of the current network.")
}

pub fn gas_price(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_gasPrice",
        "Returns the current gas price. Return: String - Current gas price in wei (hexadecimal format)",
    )
}

pub fn network_id(client: ExplorerClient) -> RpcTool {
    RpcTool::new(client, "eth_networkId", "Retrieve the network ID from explorer.")
        .with_schema(
            ToolSchema::new()
                .field("networkId", ParamField::string("The network ID in decimal format"))
                .field("version", ParamField::version()),
        )
        .with_params(|p, _| Ok(RpcParams::named([("networkId", p.value("networkId"))])))
        .render_json()
}

pub fn estimate_gas(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_estimateGas",
        "Estimates gas needed for a transaction. Note: Only Legacy transactions are supported",
    )
    .with_schema(
        ToolSchema::new()
            .field("version", ParamField::version())
            .field("from", ParamField::string("(Optional) 20-byte address of sender").optional())
            .field("to", ParamField::string("20-byte address of recipient"))
            .field(
                "gas",
                ParamField::string("(Optional) Gas provided for transaction execution").optional(),
            )
            .field("gasPrice", ParamField::string("(Optional) Gas price in wei").optional())
            .field("value", ParamField::string("(Optional) Value in wei").optional())
            .field(
                "data",
                ParamField::string("(Optional) Contract code or encoded function call data")
                    .optional(),
            ),
    )
    .with_params(|p, _| {
        let tx = object(
            ["from", "to", "gas", "gasPrice", "value", "data"]
                .into_iter()
                .map(|key| (key, p.value(key))),
        );
        Ok(RpcParams::Positional(vec![Value::Object(tx)]))
    })
}

pub fn get_balance(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_getBalance",
        "Returns the balance of the account of given address.",
    )
    .with_schema(
        ToolSchema::new()
            .field("address", ParamField::string("20-byte address to check balance for"))
            .field("perfectTimestamp", ParamField::string(PERFECT_TIMESTAMP))
            .field("version", ParamField::version()),
    )
    .with_params(|p, _| {
        Ok(RpcParams::positional([
            p.value("address"),
            p.value("perfectTimestamp"),
        ]))
    })
}

pub fn get_transaction_count(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_getTransactionCount",
        "Returns the number of transactions sent from an address.",
    )
    .with_schema(
        ToolSchema::new()
            .field("address", ParamField::string("20-byte address"))
            .field("version", ParamField::version())
            .field("perfectTimestamp", ParamField::string(PERFECT_TIMESTAMP)),
    )
    .with_params(|p, _| {
        Ok(RpcParams::positional([
            p.value("address"),
            p.value("perfectTimestamp"),
        ]))
    })
}

pub fn get_block_by_hash(client: ExplorerClient) -> RpcTool {
    RpcTool::new(client, "eth_getBlockByHash", "Returns the block with the given hash.")
        .with_schema(
            ToolSchema::new()
                .field("version", ParamField::version())
                .field("hash", ParamField::string("Block hash"))
                .field(
                    "fullTransaction",
                    ParamField::boolean(FULL_TRANSACTION).with_default(json!(false)),
                ),
        )
        .with_params(|p, _| {
            Ok(RpcParams::positional([
                p.value("hash"),
                p.value("fullTransaction"),
            ]))
        })
        .render_json()
}

pub fn get_block_by_number(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_getBlockByNumber",
        "Returns the block with the given number.",
    )
    .with_schema(
        ToolSchema::new()
            .field("version", ParamField::version())
            .field("blockNumber", ParamField::string("Block number in hexadecimal format"))
            .field(
                "fullTransaction",
                ParamField::boolean(FULL_TRANSACTION).with_default(json!(false)),
            ),
    )
    .with_params(|p, _| {
        Ok(RpcParams::positional([
            p.value("blockNumber"),
            p.value("fullTransaction"),
        ]))
    })
    .render_json()
}

pub fn get_logs(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_getLogs",
        "Returns an array of event logs matching the given filter criteria.",
    )
    .with_schema(
        ToolSchema::new()
            .field("version", ParamField::version())
            .field(
                "fromBlock",
                ParamField::string(
                    "From block timestamp specified in seconds in hexadecimal format. \
                     Can also be the tags: earliest, finalized or latest.",
                )
                .optional(),
            )
            .field(
                "toBlock",
                ParamField::string(
                    "To block timestamp specified in seconds in hexadecimal format. \
                     Can also be the tags: earliest, finalized or latest.",
                )
                .optional(),
            )
            .field("address", ParamField::string("Contract address").optional())
            .field(
                "topics",
                ParamField::nullable_string_array(
                    "Array of topic filters (up to 4 topics). Each topic can be either a string \
                     or null. Topics are ordered and must match in sequence. Null values match any topic.",
                )
                .optional()
                .max_items(4),
            )
            .field(
                "minimum_attestations",
                ParamField::number(
                    "Minimum number of attestations required for the log to be returned",
                )
                .optional(),
            ),
    )
    .with_params(|p, _| {
        let filter = object(
            ["fromBlock", "toBlock", "address", "topics", "minimum_attestations"]
                .into_iter()
                .map(|key| (key, p.value(key))),
        );
        Ok(RpcParams::Positional(vec![Value::Object(filter)]))
    })
    .render_json()
}

pub fn get_transaction_by_hash(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_getTransactionByHash",
        "Returns information about a transaction by its hash.",
    )
    .with_schema(
        ToolSchema::new()
            .field("version", ParamField::version())
            .field("hash", ParamField::string("32-byte transaction hash")),
    )
    .with_params(|p, _| Ok(RpcParams::positional([p.value("hash")])))
    .render_json()
}

pub fn get_transaction_receipt(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_getTransactionReceipt",
        "Returns the receipt of a transaction by transaction hash, including its attestations.",
    )
    .with_schema(
        ToolSchema::new()
            .field("version", ParamField::version())
            .field("hash", ParamField::string("32-byte transaction hash")),
    )
    .with_params(|p, _| Ok(RpcParams::positional([p.value("hash")])))
    .render_json()
}

pub fn send_raw_transaction(client: ExplorerClient) -> RpcTool {
    RpcTool::new(
        client,
        "eth_sendRawTransaction",
        "Submits a pre-signed transaction for broadcast to the POD network.",
    )
    .with_schema(
        ToolSchema::new()
            .field("version", ParamField::version())
            .field(
                "signedTx",
                ParamField::string("Signed transaction data in hexadecimal format"),
            )
            .field(
                "timeout",
                ParamField::integer(
                    "(Optional) Timeout in milliseconds to wait for transaction confirmation. Default is 0.",
                )
                .minimum(0.0)
                .with_default(json!(0)),
            ),
    )
    .with_params(|p, _| {
        Ok(RpcParams::positional([
            p.value("signedTx"),
            p.value("timeout"),
        ]))
    })
}
