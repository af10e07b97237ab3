// src/lib.rs

use std::sync::Arc;

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256};

pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod utils;

use blockchain::{client::RpcConnector, SessionRegistry};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Chain sessions, one per conversation plus the shared default
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Builds the state with sessions that bind clients through `connector`.
    pub fn new(config: config::Config, connector: Arc<dyn RpcConnector>) -> Self {
        let sessions = SessionRegistry::new(
            config.private_key.clone(),
            connector,
            config.default_chain,
            config.max_sessions,
        );
        Self { config, sessions }
    }
}
