//! Fixed-point token amounts.
//!
//! User input arrives as decimal strings ("10", "0.25"); contracts take base
//! units. Conversion is exact and never goes through floating point.

use alloy::primitives::utils::{format_units, parse_units, ParseUnits};
use alloy::primitives::U256;
use thiserror::Error;

/// Errors produced when parsing a user-supplied amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("invalid amount '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("amount '{input}' has more than {decimals} decimal places")]
    TooPrecise { input: String, decimals: u8 },
}

/// Parse a decimal string into base units under `decimals`.
///
/// Digits past `decimals` are refused rather than truncated; trailing zeros
/// are fine.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.trim_end_matches('0').len() > usize::from(decimals) {
            return Err(AmountError::TooPrecise {
                input: trimmed.to_string(),
                decimals,
            });
        }
    }

    match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(AmountError::Negative(trimmed.to_string())),
        Err(e) => Err(AmountError::Invalid {
            input: trimmed.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Render base units as a decimal string under `decimals`.
///
/// Falls back to the raw base-unit count if `decimals` is out of range.
pub fn format_amount(value: U256, decimals: u8) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}
