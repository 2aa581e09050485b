//! Contract surface used by the dashboard.
//!
//! Writes go through [`ContractCall`]: a target address, a human-readable
//! function signature and typed arguments. The wallet gateway encodes them
//! at submission time. Reads use the typed `sol!` bindings directly.

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::ContractsConfig;

sol! {
    /// Minimal ERC-20 surface.
    #[derive(Debug)]
    interface IERC20 {
        function approve(address spender, uint256 value) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }

    /// Batch distributor pulling approved tokens from the caller.
    #[derive(Debug)]
    interface IAirdrop {
        function multiTransferFrom(address[] recipients, uint256[] amounts) external;
    }

    /// Single-pool staking farm.
    #[derive(Debug)]
    interface ISimpleYieldFarm {
        function deposit(uint256 amount) external;
        function withdrawAll() external;
        function pendingReward(address user) external view returns (uint256);
        function rewardRate() external view returns (uint256);
        function owner() external view returns (address);
        function setRewardRate(uint256 rate) external;
    }
}

pub const APPROVE: &str = "approve(address,uint256)";
pub const MULTI_TRANSFER_FROM: &str = "multiTransferFrom(address[],uint256[])";
pub const DEPOSIT: &str = "deposit(uint256)";
pub const WITHDRAW_ALL: &str = "withdrawAll()";
pub const SET_REWARD_RATE: &str = "setRewardRate(uint256)";

/// Parsed contract addresses plus token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub token: Address,
    pub farm: Address,
    pub airdrop: Address,
    pub token_decimals: u8,
    pub token_symbol: String,
}

impl Deployment {
    pub fn from_config(config: &ContractsConfig) -> BlockchainResult<Self> {
        let parse = |value: &str| -> BlockchainResult<Address> {
            value
                .parse()
                .map_err(|_| BlockchainError::InvalidAddress(value.to_string()))
        };

        Ok(Self {
            token: parse(&config.token)?,
            farm: parse(&config.farm)?,
            airdrop: parse(&config.airdrop)?,
            token_decimals: config.token_decimals,
            token_symbol: config.token_symbol.clone(),
        })
    }
}

/// A write call as handed to the wallet gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    /// Contract receiving the call.
    pub target: Address,
    /// Human-readable signature, e.g. `approve(address,uint256)`.
    pub signature: String,
    /// Arguments in signature order.
    pub args: Vec<DynSolValue>,
}

impl ContractCall {
    pub fn new(target: Address, signature: impl Into<String>, args: Vec<DynSolValue>) -> Self {
        Self {
            target,
            signature: signature.into(),
            args,
        }
    }

    /// Function name without the parameter list.
    pub fn function_name(&self) -> &str {
        self.signature
            .split_once('(')
            .map(|(name, _)| name)
            .unwrap_or(&self.signature)
    }

    /// Selector-prefixed calldata.
    pub fn encode(&self) -> BlockchainResult<Bytes> {
        let function = Function::parse(&self.signature).map_err(|e| {
            BlockchainError::Abi(format!("Invalid signature '{}': {}", self.signature, e))
        })?;
        let data = function.abi_encode_input(&self.args).map_err(|e| {
            BlockchainError::Abi(format!("Cannot encode {}: {}", self.function_name(), e))
        })?;
        Ok(Bytes::from(data))
    }
}

fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

/// `token.approve(spender, amount)`
pub fn approve(token: Address, spender: Address, amount: U256) -> ContractCall {
    ContractCall::new(
        token,
        APPROVE,
        vec![DynSolValue::Address(spender), uint(amount)],
    )
}

/// `airdrop.multiTransferFrom(recipients, amounts)`
pub fn multi_transfer_from(airdrop: Address, recipients: &[Address], amounts: &[U256]) -> ContractCall {
    ContractCall::new(
        airdrop,
        MULTI_TRANSFER_FROM,
        vec![
            DynSolValue::Array(recipients.iter().copied().map(DynSolValue::Address).collect()),
            DynSolValue::Array(amounts.iter().copied().map(uint).collect()),
        ],
    )
}

/// `farm.deposit(amount)`
pub fn deposit(farm: Address, amount: U256) -> ContractCall {
    ContractCall::new(farm, DEPOSIT, vec![uint(amount)])
}

/// `farm.withdrawAll()`
pub fn withdraw_all(farm: Address) -> ContractCall {
    ContractCall::new(farm, WITHDRAW_ALL, Vec::new())
}

/// `farm.setRewardRate(rate)`
pub fn set_reward_rate(farm: Address, rate: U256) -> ContractCall {
    ContractCall::new(farm, SET_REWARD_RATE, vec![uint(rate)])
}
