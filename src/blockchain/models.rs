// src/blockchain/models.rs
use ethers::types::H256;
use serde::Serialize;
use thiserror::Error;

use crate::blockchain::{amount::TokenAmount, chains::Chain};

// --- Error types for token operations ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unsupported chain: {value}. Supported chains: {supported}")]
    UnsupportedChain { value: String, supported: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error(
        "The JPYC contract is not deployed on {chain_name} or its address is incorrect. \
         Try again on Ethereum Sepolia."
    )]
    ContractNotFound { chain_name: String },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),
    #[error("Missing or invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    ChainOperation(String),
}

/// Failures reported by the chain RPC collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The call succeeded but the target returned no data (no code at that address).
    #[error("contract call returned no data")]
    NoData,
    #[error("{0}")]
    Transport(String),
}

impl RpcError {
    /// Classifies a transport error message. Only used when the client library
    /// gives no structured signal.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("returned no data") {
            RpcError::NoData
        } else {
            RpcError::Transport(message)
        }
    }
}

// --- Token operation results ---

/// A token amount read on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReading {
    pub amount: TokenAmount,
    pub chain: Chain,
}

/// Balance of `address` as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReading {
    pub address: String,
    pub amount: TokenAmount,
    pub chain: Chain,
}

/// A transfer accepted by the node. No receipt has been awaited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: H256,
    pub to: String,
    pub amount: TokenAmount,
    pub chain: Chain,
}

impl TransferReceipt {
    /// 0x-prefixed full hash.
    pub fn tx_hash_hex(&self) -> String {
        format!("{:?}", self.tx_hash)
    }
}

/// Outcome of a successful `switch_chain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainSwitch {
    pub previous: Chain,
    pub current: Chain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_no_data_message() {
        assert_eq!(
            RpcError::from_message("The contract function \"balanceOf\" returned no data (\"0x\")."),
            RpcError::NoData
        );
        assert_eq!(
            RpcError::from_message("connection refused"),
            RpcError::Transport("connection refused".into())
        );
    }

    #[test]
    fn contract_not_found_names_the_chain() {
        let err = TokenError::ContractNotFound {
            chain_name: "Polygon Amoy".into(),
        };
        assert!(err.to_string().contains("Polygon Amoy"));
    }
}
