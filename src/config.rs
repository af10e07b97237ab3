// src/config.rs

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::blockchain::{services::token::TokenContract, session::DEFAULT_MAX_SESSIONS, Chain};

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,
    pub mcp_mode: bool,

    /// Chain every new session starts on.
    pub default_chain: Chain,
    /// RPC endpoint overrides; chains without an entry use their public endpoint.
    pub chain_rpc_urls: HashMap<Chain, String>,
    /// Most conversations that keep their own chain selection at once.
    pub max_sessions: usize,

    // Token settings
    pub token: TokenContract,

    /// Signing key shared by every chain. Absence is reported on first use.
    pub private_key: Option<Arc<SecretString>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            mcp_mode: false,
            default_chain: Chain::default(),
            chain_rpc_urls: HashMap::new(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            token: TokenContract::default(),
            private_key: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let default_chain = match lookup("DEFAULT_CHAIN") {
            Some(name) => name
                .trim()
                .parse::<Chain>()
                .context("DEFAULT_CHAIN must be one of sepolia, amoy, fuji")?,
            None => Chain::default(),
        };

        let mut chain_rpc_urls = HashMap::new();
        for (chain, key) in [
            (Chain::Sepolia, "SEPOLIA_RPC_URL"),
            (Chain::Amoy, "AMOY_RPC_URL"),
            (Chain::Fuji, "FUJI_RPC_URL"),
        ] {
            if let Some(url) = lookup(key).filter(|u| !u.trim().is_empty()) {
                chain_rpc_urls.insert(chain, url.trim().to_string());
            }
        }

        let max_sessions = match lookup("MAX_SESSIONS") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .context("MAX_SESSIONS must be a positive number")?,
            None => DEFAULT_MAX_SESSIONS,
        };

        let token = match lookup("JPYC_CONTRACT_ADDRESS") {
            Some(address) => TokenContract::from_address_str(address.trim())
                .context("JPYC_CONTRACT_ADDRESS must be a valid address")?,
            None => TokenContract::default(),
        };

        let private_key = lookup("PRIVATE_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|k| Arc::new(SecretString::new(k)));

        Ok(Config {
            port,
            mcp_mode: lookup("MCP_MODE").is_some(),
            default_chain,
            chain_rpc_urls,
            max_sessions,
            token,
            private_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3001);
        assert!(!config.mcp_mode);
        assert_eq!(config.default_chain, Chain::Sepolia);
        assert!(config.private_key.is_none());
        assert_eq!(config.token, TokenContract::default());
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
        assert!(config.chain_rpc_urls.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("MCP_MODE", "1"),
            ("DEFAULT_CHAIN", "fuji"),
            ("AMOY_RPC_URL", "http://localhost:8545"),
            ("PRIVATE_KEY", "0xabc"),
            ("MAX_SESSIONS", "16"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.mcp_mode);
        assert_eq!(config.default_chain, Chain::Fuji);
        assert_eq!(
            config.chain_rpc_urls.get(&Chain::Amoy).map(String::as_str),
            Some("http://localhost:8545")
        );
        assert!(!config.chain_rpc_urls.contains_key(&Chain::Sepolia));
        assert_eq!(config.max_sessions, 16);
        assert!(config.private_key.is_some());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DEFAULT_CHAIN", "mainnet")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("MAX_SESSIONS", "0")])).is_err());
        assert!(
            Config::from_lookup(lookup_from(&[("JPYC_CONTRACT_ADDRESS", "0x12")])).is_err()
        );
    }
}
