// src/blockchain/services/mod.rs

pub mod token;

pub use token::{balance_of, total_supply, transfer, TokenContract};
