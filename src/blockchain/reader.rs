//! Read-only contract queries.
//!
//! Snapshots produced here feed advisory checks (balance, ownership) before a
//! flow submits anything. They can be stale; contracts enforce the real rules.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use serde::Serialize;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::contracts::{IERC20, ISimpleYieldFarm};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Farm parameters as last read from chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FarmSnapshot {
    pub reward_rate: U256,
    pub owner: Address,
    pub is_frozen: bool,
}

impl FarmSnapshot {
    pub fn new(reward_rate: U256, owner: Address) -> Self {
        Self {
            reward_rate,
            owner,
            is_frozen: reward_rate.is_zero(),
        }
    }

    pub fn is_owner(&self, account: Address) -> bool {
        self.owner == account
    }
}

/// Typed `eth_call` wrapper.
#[derive(Debug, Clone)]
pub struct ContractReader {
    client: BlockchainClient,
}

impl ContractReader {
    pub fn new(client: BlockchainClient) -> Self {
        Self { client }
    }

    async fn read<C: SolCall>(&self, to: Address, call: C) -> BlockchainResult<C::Return> {
        let data = self.client.call(to, Bytes::from(call.abi_encode())).await?;
        C::abi_decode_returns(&data).map_err(|e| {
            BlockchainError::Abi(format!("Cannot decode {} result: {}", C::SIGNATURE, e))
        })
    }

    /// ERC-20 balance of `account`.
    pub async fn token_balance(&self, token: Address, account: Address) -> BlockchainResult<U256> {
        self.read(token, IERC20::balanceOfCall { account }).await
    }

    /// Native coin balance of `account`.
    pub async fn native_balance(&self, account: Address) -> BlockchainResult<U256> {
        self.client.get_balance(account).await
    }

    /// Rewards accrued to `user` and not yet claimed.
    pub async fn pending_reward(&self, farm: Address, user: Address) -> BlockchainResult<U256> {
        self.read(farm, ISimpleYieldFarm::pendingRewardCall { user }).await
    }

    /// Reward in wei per second per staked token.
    pub async fn reward_rate(&self, farm: Address) -> BlockchainResult<U256> {
        self.read(farm, ISimpleYieldFarm::rewardRateCall {}).await
    }

    pub async fn owner(&self, farm: Address) -> BlockchainResult<Address> {
        self.read(farm, ISimpleYieldFarm::ownerCall {}).await
    }

    /// Current reward rate and owner of the farm.
    pub async fn farm_snapshot(&self, farm: Address) -> BlockchainResult<FarmSnapshot> {
        let (reward_rate, owner) = tokio::try_join!(self.reward_rate(farm), self.owner(farm))?;
        Ok(FarmSnapshot::new(reward_rate, owner))
    }

    /// Chain ID reported by the node.
    pub async fn chain_id(&self) -> BlockchainResult<u64> {
        self.client.get_chain_id().await.map(u64::from)
    }
}
