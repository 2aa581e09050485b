//! Errors raised before a flow submits anything.

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::units::AmountError;

/// Reasons a flow refuses to start.
///
/// Failures after submission are not errors at this level; they end the
/// flow in [`TransactionStage::Failed`](crate::flow::TransactionStage::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("no valid addresses")]
    NoRecipients,

    #[error("invalid recipient address '{0}'")]
    InvalidRecipient(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("total overflows: {recipients} x {per_recipient}")]
    AmountOverflow { recipients: usize, per_recipient: U256 },

    #[error("insufficient balance: need {required} {symbol}, have {available} {symbol}")]
    InsufficientBalance {
        required: String,
        available: String,
        symbol: String,
    },

    #[error("account {account} is not the farm owner {owner}")]
    NotOwner { account: Address, owner: Address },

    #[error("protocol is already frozen")]
    AlreadyFrozen,

    #[error("protocol is not frozen")]
    NotFrozen,

    #[error("another flow is still in progress")]
    Busy,
}

impl FlowError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            FlowError::NotConnected => "not_connected",
            FlowError::NoRecipients => "no_recipients",
            FlowError::InvalidRecipient(_) => "invalid_recipient",
            FlowError::Amount(_) => "invalid_amount",
            FlowError::ZeroAmount => "zero_amount",
            FlowError::AmountOverflow { .. } => "overflow",
            FlowError::InsufficientBalance { .. } => "insufficient_balance",
            FlowError::NotOwner { .. } => "not_owner",
            FlowError::AlreadyFrozen => "already_frozen",
            FlowError::NotFrozen => "not_frozen",
            FlowError::Busy => "busy",
        }
    }
}
