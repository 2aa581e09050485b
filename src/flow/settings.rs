//! Farm owner controls: reward rate, freeze and unfreeze.
//!
//! A frozen farm is one whose reward rate is zero.

use alloy::primitives::{Address, U256};

use crate::blockchain::contracts::{self, ContractCall};
use crate::blockchain::gateway::WalletGateway;
use crate::blockchain::reader::FarmSnapshot;
use crate::config::schema::UNFREEZE_REWARD_RATE;
use crate::flow::error::FlowError;
use crate::flow::sequencer::{FlowTask, SequencedOperation, TxSequencer};
use crate::observability::metrics;
use crate::units::parse_amount;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRewardRateOperation {
    farm: Address,
    rate: U256,
}

impl SequencedOperation for SetRewardRateOperation {
    fn name(&self) -> &'static str {
        "set_reward_rate"
    }

    fn authorization(&self) -> Option<ContractCall> {
        None
    }

    fn action(&self) -> ContractCall {
        contracts::set_reward_rate(self.farm, self.rate)
    }
}

/// Settings view.
pub struct SettingsFlow<G: ?Sized> {
    sequencer: TxSequencer<G>,
    farm: Address,
}

impl<G> SettingsFlow<G>
where
    G: WalletGateway + ?Sized + 'static,
{
    pub fn new(sequencer: TxSequencer<G>, farm: Address) -> Self {
        Self { sequencer, farm }
    }

    pub fn sequencer(&self) -> &TxSequencer<G> {
        &self.sequencer
    }

    /// Set the reward rate in wei per second per staked token.
    pub fn set_reward_rate(&self, rate: &str, farm: &FarmSnapshot) -> Result<FlowTask, FlowError> {
        parse_amount(rate, 0)
            .map_err(FlowError::from)
            .and_then(|rate| self.submit(rate, farm))
            .inspect_err(reject)
    }

    /// Stop all future rewards.
    pub fn freeze(&self, farm: &FarmSnapshot) -> Result<FlowTask, FlowError> {
        if farm.is_frozen {
            reject(&FlowError::AlreadyFrozen);
            return Err(FlowError::AlreadyFrozen);
        }
        self.submit(U256::ZERO, farm).inspect_err(reject)
    }

    /// Restore rewards at roughly 100% APY.
    pub fn unfreeze(&self, farm: &FarmSnapshot) -> Result<FlowTask, FlowError> {
        if !farm.is_frozen {
            reject(&FlowError::NotFrozen);
            return Err(FlowError::NotFrozen);
        }
        parse_amount(UNFREEZE_REWARD_RATE, 0)
            .map_err(FlowError::from)
            .and_then(|rate| self.submit(rate, farm))
            .inspect_err(reject)
    }

    fn submit(&self, rate: U256, farm: &FarmSnapshot) -> Result<FlowTask, FlowError> {
        let account = self.sequencer.gateway().account().ok_or(FlowError::NotConnected)?;
        if !farm.is_owner(account) {
            return Err(FlowError::NotOwner {
                account,
                owner: farm.owner,
            });
        }

        tracing::info!(rate = %rate, farm = %self.farm, "Updating reward rate");
        self.sequencer.start(SetRewardRateOperation {
            farm: self.farm,
            rate,
        })
    }
}

fn reject(error: &FlowError) {
    tracing::warn!(error = %error, "Settings change refused");
    if !matches!(error, FlowError::Busy) {
        metrics::record_flow_rejected("set_reward_rate", error.kind());
    }
}
