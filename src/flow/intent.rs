//! Airdrop input as entered by the user.

use alloy::primitives::{Address, U256};

use crate::flow::error::FlowError;
use crate::units::parse_amount;

/// Separator between recipients in the raw input.
pub const RECIPIENT_DELIMITER: char = ',';

/// Split raw recipient input.
///
/// Entries are trimmed and blanks dropped. Order is kept and duplicates are
/// not removed: a recipient listed twice is paid twice.
pub fn parse_recipients(input: &str) -> Vec<String> {
    input
        .split(RECIPIENT_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// One airdrop request: the same amount to each listed recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub recipients: Vec<String>,
    pub per_recipient_amount: String,
    pub token_decimals: u8,
}

/// A [`TransferIntent`] that passed validation, in base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub recipients: Vec<Address>,
    pub per_recipient: U256,
    pub total: U256,
}

impl TransferIntent {
    pub fn new(
        recipients: Vec<String>,
        per_recipient_amount: impl Into<String>,
        token_decimals: u8,
    ) -> Self {
        Self {
            recipients,
            per_recipient_amount: per_recipient_amount.into(),
            token_decimals,
        }
    }

    /// Build from the delimited recipients text field.
    pub fn from_input(recipients: &str, per_recipient_amount: &str, token_decimals: u8) -> Self {
        Self::new(parse_recipients(recipients), per_recipient_amount, token_decimals)
    }

    /// Check the invariants and convert to base units.
    pub fn validate(&self) -> Result<ValidatedTransfer, FlowError> {
        let recipients = self
            .recipients
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse::<Address>()
                    .map_err(|_| FlowError::InvalidRecipient(entry.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if recipients.is_empty() {
            return Err(FlowError::NoRecipients);
        }

        let per_recipient = parse_amount(&self.per_recipient_amount, self.token_decimals)?;
        let total = amount_total(recipients.len(), per_recipient)?;

        Ok(ValidatedTransfer {
            recipients,
            per_recipient,
            total,
        })
    }
}

/// `count × per_recipient`, exact.
pub fn amount_total(count: usize, per_recipient: U256) -> Result<U256, FlowError> {
    U256::from(count)
        .checked_mul(per_recipient)
        .ok_or(FlowError::AmountOverflow {
            recipients: count,
            per_recipient,
        })
}
