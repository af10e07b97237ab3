// src/blockchain/mod.rs

pub mod amount;
pub mod chains;
pub mod client;
pub mod models;
pub mod services;
pub mod session;

pub use chains::Chain;
pub use client::{ChainRpc, EthersConnector, RpcConnector};
pub use session::{ChainSession, SessionRegistry};

// Re-export commonly used types
pub use ethers::{
    types::{Address, H256, U256},
    utils::to_checksum,
};
