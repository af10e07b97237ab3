//! The five JPYC tools exposed over MCP.
//!
//! Every tool returns a record with a `success` flag. Failures of any kind are
//! reported as `{"success": false, "error": "..."}` and never escape as a
//! JSON-RPC error.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::blockchain::{
    amount::amount_text_from_json,
    models::TokenError,
    services::token::{self, base_units, TokenContract},
    session::ChainSession,
    to_checksum, Chain,
};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Balance,
    Transfer,
    SwitchChain,
    GetCurrentChain,
    TotalSupply,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Balance,
        Tool::Transfer,
        Tool::SwitchChain,
        Tool::GetCurrentChain,
        Tool::TotalSupply,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Balance => "jpyc_balance",
            Tool::Transfer => "jpyc_transfer",
            Tool::SwitchChain => "jpyc_switch_chain",
            Tool::GetCurrentChain => "jpyc_get_current_chain",
            Tool::TotalSupply => "jpyc_total_supply",
        }
    }

    /// Accepts the MCP name, the bare operation name and dashed variants.
    pub fn from_name(name: &str) -> Option<Tool> {
        let normalized = name.trim().replace('-', "_");
        let bare = normalized.strip_prefix("jpyc_").unwrap_or(&normalized);
        match bare {
            "balance" => Some(Tool::Balance),
            "transfer" => Some(Tool::Transfer),
            "switch_chain" => Some(Tool::SwitchChain),
            "get_current_chain" => Some(Tool::GetCurrentChain),
            "total_supply" => Some(Tool::TotalSupply),
            _ => None,
        }
    }

    /// Entry for `tools/list`.
    pub fn definition(&self) -> Value {
        let chains: Vec<&str> = Chain::ALL.iter().map(|c| c.as_str()).collect();
        match self {
            Tool::Balance => json!({
                "name": self.name(),
                "description": "Get the JPYC balance of an address on the currently selected testnet. Without an address, returns the balance of the server wallet.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "address": {"type": "string", "description": "0x-prefixed Ethereum address to query (defaults to the server wallet)."}
                    },
                    "required": [],
                    "additionalProperties": false
                }
            }),
            Tool::Transfer => json!({
                "name": self.name(),
                "description": "Send JPYC to an address on the currently selected testnet, e.g. send 10 JPYC to 0x123...",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "to": {"type": "string", "description": "Recipient address (0x followed by 40 hex digits)."},
                        "amount": {"type": "number", "description": "Amount in JPYC, e.g. 10."}
                    },
                    "required": ["to", "amount"],
                    "additionalProperties": false
                }
            }),
            Tool::SwitchChain => json!({
                "name": self.name(),
                "description": "Switch the testnet JPYC operations run on: sepolia (Ethereum), amoy (Polygon), fuji (Avalanche).",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "chain": {"type": "string", "enum": chains, "description": "Target chain."}
                    },
                    "required": ["chain"],
                    "additionalProperties": false
                }
            }),
            Tool::GetCurrentChain => json!({
                "name": self.name(),
                "description": "Get the currently selected testnet and the server wallet address.",
                "inputSchema": {"type": "object", "properties": {}, "additionalProperties": false}
            }),
            Tool::TotalSupply => json!({
                "name": self.name(),
                "description": "Get the total JPYC supply on the currently selected testnet.",
                "inputSchema": {"type": "object", "properties": {}, "additionalProperties": false}
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceRecord {
    address: String,
    balance: String,
    balance_raw: String,
    balance_base_units: String,
    chain: Chain,
    chain_name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferRecord {
    message: String,
    transaction_hash: String,
    explorer_url: String,
    chain: Chain,
    chain_name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchRecord {
    message: String,
    previous_chain: Chain,
    new_chain: Chain,
    chain_name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentChainRecord {
    chain: Chain,
    chain_name: &'static str,
    address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalSupplyRecord {
    total_supply: String,
    total_supply_raw: String,
    total_supply_base_units: String,
    chain: Chain,
    chain_name: &'static str,
}

/// Flattens an operation result into the uniform success/failure record.
fn into_record<T: Serialize>(tool: Tool, result: Result<T, TokenError>) -> Value {
    let failure = |message: String| json!({ "success": false, "error": message });
    match result {
        Ok(record) => match serde_json::to_value(record) {
            Ok(Value::Object(mut map)) => {
                map.insert("success".into(), Value::Bool(true));
                Value::Object(map)
            }
            Ok(other) => json!({ "success": true, "data": other }),
            Err(e) => failure(e.to_string()),
        },
        Err(e) => {
            error!("{} failed: {}", tool.name(), e);
            failure(e.to_string())
        }
    }
}

async fn balance(session: &ChainSession, token: &TokenContract, args: &Value) -> Result<BalanceRecord, TokenError> {
    let address = utils::get_optional_str(args, "address")?;
    let reading = token::balance_of(session, token, address).await?;
    let raw = reading.amount.to_string();
    Ok(BalanceRecord {
        address: reading.address,
        balance: token.label(&reading.amount),
        balance_raw: raw,
        balance_base_units: base_units(&reading.amount),
        chain: reading.chain,
        chain_name: reading.chain.display_name(),
    })
}

async fn transfer(session: &ChainSession, token: &TokenContract, args: &Value) -> Result<TransferRecord, TokenError> {
    let to = utils::get_required_arg::<String>(args, "to")?;
    let amount = args
        .get("amount")
        .filter(|v| !v.is_null())
        .ok_or_else(|| TokenError::InvalidArgument("'amount' is required".into()))?;
    let amount = amount_text_from_json(amount)?;
    let receipt = token::transfer(session, token, &to, &amount).await?;
    let tx_hash = receipt.tx_hash_hex();
    let chain = receipt.chain;
    Ok(TransferRecord {
        message: format!(
            "Sent {} to {} on {}",
            token.label(&receipt.amount),
            receipt.to,
            chain.display_name()
        ),
        explorer_url: chain.explorer_link(&tx_hash),
        transaction_hash: tx_hash,
        chain,
        chain_name: chain.display_name(),
    })
}

fn switch_chain(session: &ChainSession, args: &Value) -> Result<SwitchRecord, TokenError> {
    let target = utils::get_required_arg::<String>(args, "chain")?;
    let switched = session.switch_chain_by_name(&target)?;
    let chain_name = session.chain_display_name(Some(&target))?;
    Ok(SwitchRecord {
        message: format!(
            "Switched chain from {} to {}",
            switched.previous.display_name(),
            chain_name
        ),
        previous_chain: switched.previous,
        new_chain: switched.current,
        chain_name,
    })
}

fn current_chain(session: &ChainSession) -> Result<CurrentChainRecord, TokenError> {
    let chain = session.current_chain();
    let address = session.current_address()?;
    Ok(CurrentChainRecord {
        chain,
        chain_name: chain.display_name(),
        address: to_checksum(&address, None),
    })
}

async fn total_supply(session: &ChainSession, token: &TokenContract) -> Result<TotalSupplyRecord, TokenError> {
    let reading = token::total_supply(session, token).await?;
    Ok(TotalSupplyRecord {
        total_supply: token.label(&reading.amount),
        total_supply_raw: reading.amount.to_string(),
        total_supply_base_units: base_units(&reading.amount),
        chain: reading.chain,
        chain_name: reading.chain.display_name(),
    })
}

/// Runs `tool` against `session` and returns its result record.
pub async fn execute(tool: Tool, session: &ChainSession, token: &TokenContract, args: &Value) -> Value {
    info!("Executing tool {}", tool.name());
    match tool {
        Tool::Balance => into_record(tool, balance(session, token, args).await),
        Tool::Transfer => into_record(tool, transfer(session, token, args).await),
        Tool::SwitchChain => into_record(tool, switch_chain(session, args)),
        Tool::GetCurrentChain => into_record(tool, current_chain(session)),
        Tool::TotalSupply => into_record(tool, total_supply(session, token).await),
    }
}
