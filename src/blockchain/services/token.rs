// src/blockchain/services/token.rs

use std::str::FromStr;

use anyhow::{anyhow, Result};
use ethers::abi::{decode, ParamType, Token};
use ethers::types::{Address, Bytes, H160};
use ethers::utils::to_checksum;
use tracing::{error, info};

use crate::blockchain::{
    amount::{TokenAmount, TOKEN_DECIMALS},
    chains::Chain,
    models::{BalanceReading, RpcError, TokenError, TokenReading, TransferReceipt},
    session::ChainSession,
};
use crate::utils::parse_address;

pub const JPYC_SYMBOL: &str = "JPYC";
/// JPYC is deployed at the same address on every supported testnet:
/// 0x431D5dfF03120AFA4bDf332c61A6e1766eF37BDB
pub const DEFAULT_JPYC_ADDRESS: Address = H160([
    0x43, 0x1d, 0x5d, 0xff, 0x03, 0x12, 0x0a, 0xfa, 0x4b, 0xdf, 0x33, 0x2c, 0x61, 0xa6, 0xe1,
    0x76, 0x6e, 0xf3, 0x7b, 0xdb,
]);

const BALANCE_OF: &str = "balanceOf(address)";
const TOTAL_SUPPLY: &str = "totalSupply()";
const TRANSFER: &str = "transfer(address,uint256)";

/// The ERC-20 contract the facade operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContract {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenContract {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            symbol: JPYC_SYMBOL.to_string(),
            decimals: TOKEN_DECIMALS,
        }
    }

    pub fn from_address_str(address: &str) -> Result<Self> {
        let address = Address::from_str(address)
            .map_err(|e| anyhow!("invalid token contract address '{}': {}", address, e))?;
        Ok(Self::new(address))
    }

    /// "10 JPYC"
    pub fn label(&self, amount: &TokenAmount) -> String {
        format!("{} {}", amount, self.symbol)
    }
}

impl Default for TokenContract {
    fn default() -> Self {
        Self::new(DEFAULT_JPYC_ADDRESS)
    }
}

fn read_error(err: RpcError, chain: Chain, context: &str) -> TokenError {
    match err {
        RpcError::NoData => TokenError::ContractNotFound {
            chain_name: chain.display_name().to_string(),
        },
        RpcError::Transport(message) => {
            TokenError::ChainOperation(format!("{}: {}", context, message))
        }
    }
}

fn decode_amount(raw: &Bytes, token: &TokenContract, chain: Chain) -> Result<TokenAmount, TokenError> {
    if raw.is_empty() {
        return Err(TokenError::ContractNotFound {
            chain_name: chain.display_name().to_string(),
        });
    }
    let tokens = decode(&[ParamType::Uint(256)], raw)
        .map_err(|e| TokenError::ChainOperation(format!("could not decode uint256: {}", e)))?;
    match tokens.first() {
        Some(Token::Uint(value)) => Ok(TokenAmount::from_raw(*value, token.decimals)),
        _ => Err(TokenError::ChainOperation(
            "contract returned an unexpected value".into(),
        )),
    }
}

/// Token balance of `owner` (or of the session account) on the selected chain.
pub async fn balance_of(
    session: &ChainSession,
    token: &TokenContract,
    owner: Option<&str>,
) -> Result<BalanceReading, TokenError> {
    let (address, owner) = match owner {
        Some(text) => (text.to_string(), parse_address(text)?),
        None => {
            let account = session.current_address()?;
            (to_checksum(&account, None), account)
        }
    };
    let binding = session.ensure_binding()?;
    let raw = binding
        .rpc
        .read_contract_field(token.address, BALANCE_OF, vec![Token::Address(owner)])
        .await
        .map_err(|e| {
            error!("[balance_of] {} on {}: {}", address, binding.chain, e);
            read_error(e, binding.chain, "Failed to get balance")
        })?;
    let amount = decode_amount(&raw, token, binding.chain)?;
    info!("balance: address={}, balance={}", address, token.label(&amount));
    Ok(BalanceReading {
        address,
        amount,
        chain: binding.chain,
    })
}

/// Total supply on the selected chain.
pub async fn total_supply(
    session: &ChainSession,
    token: &TokenContract,
) -> Result<TokenReading, TokenError> {
    let binding = session.ensure_binding()?;
    let raw = binding
        .rpc
        .read_contract_field(token.address, TOTAL_SUPPLY, vec![])
        .await
        .map_err(|e| {
            error!("[total_supply] on {}: {}", binding.chain, e);
            read_error(e, binding.chain, "Failed to get total supply")
        })?;
    let amount = decode_amount(&raw, token, binding.chain)?;
    Ok(TokenReading {
        amount,
        chain: binding.chain,
    })
}

/// Submits `transfer(to, amount)` signed by the session account. Returns as soon
/// as the node accepts the transaction.
pub async fn transfer(
    session: &ChainSession,
    token: &TokenContract,
    to: &str,
    amount: &str,
) -> Result<TransferReceipt, TokenError> {
    let recipient = parse_address(to)?;
    let amount = TokenAmount::parse_positive(amount, token.decimals)?;
    let binding = session.ensure_binding()?;
    let tx_hash = binding
        .rpc
        .submit_contract_call(
            token.address,
            TRANSFER,
            vec![Token::Address(recipient), Token::Uint(amount.raw())],
        )
        .await
        .map_err(|e| {
            error!("[transfer] to {} on {}: {}", to, binding.chain, e);
            TokenError::ChainOperation(format!("Failed to transfer: {}", e))
        })?;
    info!(
        "transfer: {} to {} on {} ({:?})",
        token.label(&amount),
        to,
        binding.chain,
        tx_hash
    );
    Ok(TransferReceipt {
        tx_hash,
        to: to.to_string(),
        amount,
        chain: binding.chain,
    })
}

/// Raw base units as a decimal string, for callers that want the integer.
pub fn base_units(amount: &TokenAmount) -> String {
    amount.raw().to_string()
}
