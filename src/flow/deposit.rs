//! Farm staking: approve-then-deposit, and single-step withdraw.

use alloy::primitives::{Address, U256};

use crate::blockchain::contracts::{self, ContractCall, Deployment};
use crate::blockchain::gateway::WalletGateway;
use crate::flow::error::FlowError;
use crate::flow::sequencer::{FlowTask, SequencedOperation, TxSequencer};
use crate::observability::metrics;
use crate::units::{format_amount, parse_amount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOperation {
    token: Address,
    farm: Address,
    amount: U256,
}

impl SequencedOperation for DepositOperation {
    fn name(&self) -> &'static str {
        "deposit"
    }

    fn authorization(&self) -> Option<ContractCall> {
        Some(contracts::approve(self.token, self.farm, self.amount))
    }

    fn action(&self) -> ContractCall {
        contracts::deposit(self.farm, self.amount)
    }
}

/// Withdraws the whole stake and claims pending rewards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawAllOperation {
    farm: Address,
}

impl SequencedOperation for WithdrawAllOperation {
    fn name(&self) -> &'static str {
        "withdraw_all"
    }

    fn authorization(&self) -> Option<ContractCall> {
        None
    }

    fn action(&self) -> ContractCall {
        contracts::withdraw_all(self.farm)
    }
}

/// Deposit view. Deposit and withdraw share one sequencer, so either one
/// blocks the other while in flight.
pub struct FarmFlow<G: ?Sized> {
    sequencer: TxSequencer<G>,
    deployment: Deployment,
}

impl<G> FarmFlow<G>
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

    /// Start approve → deposit for `amount` tokens.
    pub fn deposit(&self, amount: &str, balance: Option<U256>) -> Result<FlowTask, FlowError> {
        self.prepare_deposit(amount, balance)
            .and_then(|operation| self.sequencer.start(operation))
            .inspect_err(|e| reject("deposit", e))
    }

    /// Start the single-step withdrawAll.
    pub fn withdraw_all(&self) -> Result<FlowTask, FlowError> {
        self.require_account()
            .and_then(|_| {
                self.sequencer.start(WithdrawAllOperation {
                    farm: self.deployment.farm,
                })
            })
            .inspect_err(|e| reject("withdraw_all", e))
    }

    fn require_account(&self) -> Result<Address, FlowError> {
        self.sequencer.gateway().account().ok_or(FlowError::NotConnected)
    }

    fn prepare_deposit(&self, amount: &str, balance: Option<U256>) -> Result<DepositOperation, FlowError> {
        self.require_account()?;

        let decimals = self.deployment.token_decimals;
        let amount = parse_amount(amount, decimals)?;
        if amount.is_zero() {
            return Err(FlowError::ZeroAmount);
        }

        if let Some(available) = balance {
            if amount > available {
                return Err(FlowError::InsufficientBalance {
                    required: format_amount(amount, decimals),
                    available: format_amount(available, decimals),
                    symbol: self.deployment.token_symbol.clone(),
                });
            }
        }

        Ok(DepositOperation {
            token: self.deployment.token,
            farm: self.deployment.farm,
            amount,
        })
    }
}

fn reject(flow: &'static str, error: &FlowError) {
    tracing::warn!(flow, error = %error, "Farm operation refused");
    if !matches!(error, FlowError::Busy) {
        metrics::record_flow_rejected(flow, error.kind());
    }
}
