// src/blockchain/chains.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blockchain::models::TokenError;

/// One of the EVM test networks the token can be operated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Sepolia,
    Amoy,
    Fuji,
}

impl Chain {
    pub const ALL: [Chain; 3] = [Chain::Sepolia, Chain::Amoy, Chain::Fuji];

    /// Identifier used on the wire (`"sepolia"`, `"amoy"`, `"fuji"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Sepolia => "sepolia",
            Chain::Amoy => "amoy",
            Chain::Fuji => "fuji",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Sepolia => 11_155_111,
            Chain::Amoy => 80_002,
            Chain::Fuji => 43_113,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Sepolia => "Ethereum Sepolia",
            Chain::Amoy => "Polygon Amoy",
            Chain::Fuji => "Avalanche Fuji",
        }
    }

    /// Public RPC endpoint used unless the configuration overrides it.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Chain::Sepolia => "https://ethereum-sepolia-rpc.publicnode.com",
            Chain::Amoy => "https://rpc-amoy.polygon.technology",
            Chain::Fuji => "https://api.avax-test.network/ext/bc/C/rpc",
        }
    }

    /// Block explorer prefix; the transaction hash is appended as-is.
    pub fn explorer_tx_url(&self) -> &'static str {
        match self {
            Chain::Sepolia => "https://sepolia.etherscan.io/tx/",
            Chain::Amoy => "https://amoy.polygonscan.com/tx/",
            Chain::Fuji => "https://testnet.snowtrace.io/tx/",
        }
    }

    pub fn explorer_link(&self, tx_hash: &str) -> String {
        format!("{}{}", self.explorer_tx_url(), tx_hash)
    }

    /// Comma separated list of every supported identifier, for error messages.
    pub fn supported_list() -> String {
        Chain::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Chain {
    fn default() -> Self {
        Chain::Sepolia
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sepolia" => Ok(Chain::Sepolia),
            "amoy" => Ok(Chain::Amoy),
            "fuji" => Ok(Chain::Fuji),
            other => Err(TokenError::UnsupportedChain {
                value: other.to_string(),
                supported: Chain::supported_list(),
            }),
        }
    }
}

/// Display name for an untyped identifier. Unknown identifiers are rejected the
/// same way `switch_chain` rejects them.
pub fn display_name_for(identifier: &str) -> Result<&'static str, TokenError> {
    identifier.parse::<Chain>().map(|c| c.display_name())
}
