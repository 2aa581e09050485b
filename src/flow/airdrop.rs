//! Airdrop: approve the airdrop contract for the total, then
//! `multiTransferFrom` one amount per recipient occurrence.

use alloy::primitives::{Address, U256};

use crate::blockchain::contracts::{self, ContractCall, Deployment};
use crate::blockchain::gateway::WalletGateway;
use crate::flow::error::FlowError;
use crate::flow::intent::{TransferIntent, ValidatedTransfer};
use crate::flow::sequencer::{FlowTask, SequencedOperation, TxSequencer};
use crate::observability::metrics;
use crate::units::format_amount;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropOperation {
    token: Address,
    airdrop: Address,
    transfer: ValidatedTransfer,
}

impl AirdropOperation {
    pub fn new(token: Address, airdrop: Address, transfer: ValidatedTransfer) -> Self {
        Self {
            token,
            airdrop,
            transfer,
        }
    }
}

impl SequencedOperation for AirdropOperation {
    fn name(&self) -> &'static str {
        "airdrop"
    }

    fn authorization(&self) -> Option<ContractCall> {
        Some(contracts::approve(self.token, self.airdrop, self.transfer.total))
    }

    fn action(&self) -> ContractCall {
        let amounts = vec![self.transfer.per_recipient; self.transfer.recipients.len()];
        contracts::multi_transfer_from(self.airdrop, &self.transfer.recipients, &amounts)
    }
}

/// Airdrop view.
pub struct AirdropFlow<G: ?Sized> {
    sequencer: TxSequencer<G>,
    deployment: Deployment,
}

impl<G> AirdropFlow<G>
where
    G: WalletGateway + ?Sized + 'static,
{
    pub fn new(sequencer: TxSequencer<G>, deployment: Deployment) -> Self {
        Self {
            sequencer,
            deployment,
        }
    }

    pub fn sequencer(&self) -> &TxSequencer<G> {
        &self.sequencer
    }

    /// Validate `intent` and start approve → multiTransferFrom.
    ///
    /// `balance` is the last fetched token balance of the connected account.
    /// When present, a total above it is refused before anything is
    /// submitted. The snapshot may be stale; the token contract has the final
    /// word.
    pub fn start(&self, intent: &TransferIntent, balance: Option<U256>) -> Result<FlowTask, FlowError> {
        self.prepare(intent, balance)
            .and_then(|operation| self.sequencer.start(operation))
            .inspect_err(|e| {
                tracing::warn!(error = %e, "Airdrop refused");
                if !matches!(e, FlowError::Busy) {
                    metrics::record_flow_rejected("airdrop", e.kind());
                }
            })
    }

    fn prepare(&self, intent: &TransferIntent, balance: Option<U256>) -> Result<AirdropOperation, FlowError> {
        if self.sequencer.gateway().account().is_none() {
            return Err(FlowError::NotConnected);
        }

        let transfer = intent.validate()?;

        if let Some(available) = balance {
            if transfer.total > available {
                return Err(FlowError::InsufficientBalance {
                    required: format_amount(transfer.total, intent.token_decimals),
                    available: format_amount(available, intent.token_decimals),
                    symbol: self.deployment.token_symbol.clone(),
                });
            }
        }

        tracing::info!(
            recipients = transfer.recipients.len(),
            total = %transfer.total,
            "Airdrop validated"
        );

        Ok(AirdropOperation::new(
            self.deployment.token,
            self.deployment.airdrop,
            transfer,
        ))
    }
}
