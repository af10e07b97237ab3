//! Chain RPC collaborator.
//!
//! A [`ChainRpc`] is the (read client, write client) pair bound to one chain and
//! one signing account. It is produced synchronously by an [`RpcConnector`], which
//! lets the session manager rebuild it without suspending.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::{encode, Token},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, H256},
    utils::keccak256,
};
use tracing::debug;

use crate::blockchain::{
    chains::Chain,
    models::{RpcError, TokenError},
};

/// On-chain reads and writes against whichever chain the client was bound to.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `eth_call` of a view function. Returns the raw ABI-encoded return data,
    /// which is empty when nothing is deployed at `contract`.
    async fn read_contract_field(
        &self,
        contract: Address,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<Bytes, RpcError>;

    /// Signs and submits a contract call with the bound account. Resolves once
    /// the node has accepted the transaction.
    async fn submit_contract_call(
        &self,
        contract: Address,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<H256, RpcError>;
}

/// Builds a [`ChainRpc`] for a chain and account. Must not block or suspend.
pub trait RpcConnector: Send + Sync {
    fn connect(&self, chain: Chain, account: &LocalWallet) -> Result<Arc<dyn ChainRpc>, TokenError>;
}

fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

/// Selector followed by the ABI-encoded arguments.
pub fn encode_call(sig: &str, tokens: &[Token]) -> Bytes {
    let mut out = selector(sig).to_vec();
    out.extend(encode(tokens));
    Bytes::from(out)
}

/// Connector backed by ethers HTTP providers, one endpoint per chain.
#[derive(Debug, Clone)]
pub struct EthersConnector {
    rpc_urls: HashMap<Chain, String>,
}

impl EthersConnector {
    pub fn new(rpc_urls: HashMap<Chain, String>) -> Self {
        Self { rpc_urls }
    }

    pub fn rpc_url(&self, chain: Chain) -> &str {
        self.rpc_urls
            .get(&chain)
            .map(String::as_str)
            .unwrap_or_else(|| chain.default_rpc_url())
    }
}

impl RpcConnector for EthersConnector {
    fn connect(&self, chain: Chain, account: &LocalWallet) -> Result<Arc<dyn ChainRpc>, TokenError> {
        let url = self.rpc_url(chain);
        let provider = Provider::<Http>::try_from(url).map_err(|e| {
            TokenError::Configuration(format!("invalid RPC URL for {}: {}", chain, e))
        })?;
        let wallet = account.clone().with_chain_id(chain.chain_id());
        let signer = SignerMiddleware::new(provider.clone(), wallet);
        debug!("Bound {} client to {}", chain.display_name(), url);
        Ok(Arc::new(EthersRpc { provider, signer }))
    }
}

/// Read client plus signing write client on the same endpoint.
pub struct EthersRpc {
    provider: Provider<Http>,
    signer: SignerMiddleware<Provider<Http>, LocalWallet>,
}

#[async_trait]
impl ChainRpc for EthersRpc {
    async fn read_contract_field(
        &self,
        contract: Address,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<Bytes, RpcError> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(contract)
            .data(encode_call(signature, &args))
            .into();
        self.provider
            .call(&tx, None)
            .await
            .map_err(|e| RpcError::from_message(e.to_string()))
    }

    async fn submit_contract_call(
        &self,
        contract: Address,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<H256, RpcError> {
        let tx = TransactionRequest::new()
            .to(contract)
            .data(encode_call(signature, &args));
        let pending = self
            .signer
            .send_transaction(tx, None)
            .await
            .map_err(|e| RpcError::from_message(e.to_string()))?;
        Ok(pending.tx_hash())
    }
}
