//! Utility functions for the JPYC MCP server

use std::str::FromStr;

use ethers::types::Address;
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::blockchain::models::TokenError;

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(args: &Value, key: &str) -> Result<T, TokenError> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null))
        .map_err(|_| TokenError::InvalidArgument(format!("'{}' is required", key)))
}

/// Optional string argument. Absent, `null` and empty strings read as `None`;
/// any other non-string value is an error.
pub fn get_optional_str<'a>(args: &'a Value, key: &str) -> Result<Option<&'a str>, TokenError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(TokenError::InvalidArgument(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

/// Parses a `0x`-prefixed, 40 hex digit address. Case is not checked against
/// the EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, TokenError> {
    let hex_part = input
        .strip_prefix("0x")
        .ok_or_else(|| TokenError::InvalidAddress(input.to_string()))?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TokenError::InvalidAddress(input.to_string()));
    }
    Address::from_str(input).map_err(|_| TokenError::InvalidAddress(input.to_string()))
}
