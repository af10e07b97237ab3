// src/blockchain/amount.rs

use std::fmt;

use ethers::types::U256;
use serde_json::Value;

use crate::blockchain::models::TokenError;

/// Decimal places of the JPYC token.
pub const TOKEN_DECIMALS: u8 = 18;

/// A token quantity held in base units alongside its decimal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn from_raw(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    /// Parses a human decimal string ("10", "0.5") into base units without any
    /// floating point step. Signs, exponents and excess precision are rejected.
    pub fn parse(input: &str, decimals: u8) -> Result<Self, TokenError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(TokenError::InvalidAmount("amount is empty".into()));
        }
        if s.starts_with('-') {
            return Err(TokenError::InvalidAmount(format!(
                "{} is not positive",
                s
            )));
        }
        let s = s.strip_prefix('+').unwrap_or(s);

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(TokenError::InvalidAmount(format!("{} is not a number", input)));
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(TokenError::InvalidAmount(format!("{} is not a number", input)));
        }
        if frac_part.len() > decimals as usize {
            return Err(TokenError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                input, decimals
            )));
        }

        let overflow = || TokenError::InvalidAmount(format!("{} is too large", input));
        let int_value = if int_part.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(int_part).map_err(|_| overflow())?
        };
        let padded = format!("{:0<width$}", frac_part, width = decimals as usize);
        let frac_value = if padded.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(&padded).map_err(|_| overflow())?
        };

        let raw = int_value
            .checked_mul(U256::exp10(decimals as usize))
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(overflow)?;
        Ok(Self { raw, decimals })
    }

    /// Like [`TokenAmount::parse`] but additionally requires a non-zero amount,
    /// which is what a transfer needs.
    pub fn parse_positive(input: &str, decimals: u8) -> Result<Self, TokenError> {
        let amount = Self::parse(input, decimals)?;
        if amount.raw.is_zero() {
            return Err(TokenError::InvalidAmount(format!(
                "{} is not positive",
                input.trim()
            )));
        }
        Ok(amount)
    }

    /// Decimal rendering without trailing fractional zeros ("10", "0.5", "0").
    pub fn to_decimal_string(&self) -> String {
        let (int_value, frac_value) = self.raw.div_mod(U256::exp10(self.decimals as usize));
        if frac_value.is_zero() {
            return int_value.to_string();
        }
        let frac = format!(
            "{:0>width$}",
            frac_value.to_string(),
            width = self.decimals as usize
        );
        format!("{}.{}", int_value, frac.trim_end_matches('0'))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Turns a JSON amount argument into decimal text. Integers keep their exact
/// digits; fractional numbers use the shortest representation that round-trips
/// to the same double, which never uses exponent notation.
pub fn amount_text_from_json(value: &Value) -> Result<String, TokenError> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(TokenError::InvalidAmount(format!("{} is not finite", n)));
                }
                Ok(format!("{}", f))
            } else {
                Err(TokenError::InvalidAmount(format!("{} is not a number", n)))
            }
        }
        Value::String(s) => Ok(s.trim().to_string()),
        other => Err(TokenError::InvalidArgument(format!(
            "'amount' must be a number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_token_round_trips() {
        let amount = TokenAmount::parse("10", TOKEN_DECIMALS).unwrap();
        assert_eq!(amount.raw(), U256::exp10(19));
        assert_eq!(amount.to_decimal_string(), "10");
    }

    #[test]
    fn single_base_unit_round_trips() {
        let amount = TokenAmount::parse("0.000000000000000001", TOKEN_DECIMALS).unwrap();
        assert_eq!(amount.raw(), U256::one());
        assert_eq!(amount.to_string(), "0.000000000000000001");
    }

    #[test]
    fn formats_like_format_units() {
        let half = TokenAmount::from_raw(U256::exp10(17) * 5, TOKEN_DECIMALS);
        assert_eq!(half.to_string(), "0.5");
        let zero = TokenAmount::from_raw(U256::zero(), TOKEN_DECIMALS);
        assert_eq!(zero.to_string(), "0");
        let mixed = TokenAmount::parse("1234.05", TOKEN_DECIMALS).unwrap();
        assert_eq!(mixed.to_string(), "1234.05");
    }

    #[test]
    fn accepts_leading_or_trailing_dot() {
        assert_eq!(TokenAmount::parse(".5", 18).unwrap().to_string(), "0.5");
        assert_eq!(TokenAmount::parse("5.", 18).unwrap().to_string(), "5");
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(matches!(
            TokenAmount::parse_positive("0", TOKEN_DECIMALS),
            Err(TokenError::InvalidAmount(_))
        ));
        assert!(matches!(
            TokenAmount::parse_positive("0.000", TOKEN_DECIMALS),
            Err(TokenError::InvalidAmount(_))
        ));
        assert!(matches!(
            TokenAmount::parse_positive("-5", TOKEN_DECIMALS),
            Err(TokenError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_unrepresentable_amounts() {
        assert!(TokenAmount::parse("0.0000000000000000001", TOKEN_DECIMALS).is_err());
        assert!(TokenAmount::parse("1e18", TOKEN_DECIMALS).is_err());
        assert!(TokenAmount::parse("abc", TOKEN_DECIMALS).is_err());
        assert!(TokenAmount::parse(".", TOKEN_DECIMALS).is_err());
        let huge = "9".repeat(80);
        assert!(TokenAmount::parse(&huge, TOKEN_DECIMALS).is_err());
    }

    #[test]
    fn json_numbers_become_exact_text() {
        assert_eq!(amount_text_from_json(&json!(10)).unwrap(), "10");
        assert_eq!(amount_text_from_json(&json!(-5)).unwrap(), "-5");
        assert_eq!(amount_text_from_json(&json!(2.5)).unwrap(), "2.5");
        assert_eq!(
            amount_text_from_json(&json!(0.000000000000000001)).unwrap(),
            "0.000000000000000001"
        );
        assert_eq!(amount_text_from_json(&json!(" 7 ")).unwrap(), "7");
        assert!(matches!(
            amount_text_from_json(&json!(true)),
            Err(TokenError::InvalidArgument(_))
        ));
    }
}
