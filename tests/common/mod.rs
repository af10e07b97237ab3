#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::{
    abi::{encode, Token},
    signers::LocalWallet,
    types::{Address, Bytes, H256, U256},
};
use jpyc_mcp_server::{
    blockchain::{
        client::{ChainRpc, RpcConnector},
        models::{RpcError, TokenError},
        Chain,
    },
    config::Config,
    AppState,
};
use secrecy::SecretString;

pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// In-memory stand-in for the three testnets.
#[derive(Default)]
pub struct Ledger {
    /// Balance returned by `balanceOf`, in base units, per chain.
    pub balances: HashMap<Chain, u128>,
    /// Value returned by `totalSupply`, in base units, per chain.
    pub supplies: HashMap<Chain, u128>,
    /// Chains where the token contract is missing and reads return no data.
    pub undeployed: HashSet<Chain>,
    /// Every write as (chain, signature, args).
    pub submitted: Vec<(Chain, String, Vec<Token>)>,
    /// Number of clients built so far.
    pub connects: usize,
}

pub type SharedLedger = Arc<Mutex<Ledger>>;

struct FakeRpc {
    chain: Chain,
    ledger: SharedLedger,
}

#[async_trait]
impl ChainRpc for FakeRpc {
    async fn read_contract_field(
        &self,
        _contract: Address,
        signature: &str,
        _args: Vec<Token>,
    ) -> Result<Bytes, RpcError> {
        let ledger = self.ledger.lock().unwrap();
        if ledger.undeployed.contains(&self.chain) {
            return Ok(Bytes::default());
        }
        let value = if signature.starts_with("totalSupply") {
            ledger.supplies.get(&self.chain).copied().unwrap_or_default()
        } else {
            ledger.balances.get(&self.chain).copied().unwrap_or_default()
        };
        Ok(Bytes::from(encode(&[Token::Uint(U256::from(value))])))
    }

    async fn submit_contract_call(
        &self,
        _contract: Address,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<H256, RpcError> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger
            .submitted
            .push((self.chain, signature.to_string(), args));
        Ok(H256::repeat_byte(0x11))
    }
}

pub struct FakeConnector(pub SharedLedger);

impl RpcConnector for FakeConnector {
    fn connect(&self, chain: Chain, _account: &LocalWallet) -> Result<Arc<dyn ChainRpc>, TokenError> {
        self.0.lock().unwrap().connects += 1;
        Ok(Arc::new(FakeRpc {
            chain,
            ledger: self.0.clone(),
        }))
    }
}

pub fn one_jpyc() -> u128 {
    1_000_000_000_000_000_000
}

/// State backed by the fake ledger, signing with the first Anvil account.
pub fn test_state() -> (AppState, SharedLedger) {
    test_state_with_key(Some(TEST_KEY))
}

pub fn test_state_with_key(key: Option<&str>) -> (AppState, SharedLedger) {
    let ledger: SharedLedger = Arc::new(Mutex::new(Ledger::default()));
    let config = Config {
        private_key: key.map(|k| Arc::new(SecretString::new(k.to_string()))),
        ..Config::default()
    };
    let state = AppState::new(config, Arc::new(FakeConnector(ledger.clone())));
    (state, ledger)
}
