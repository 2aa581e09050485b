//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dashboard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Reward rate that roughly corresponds to 100% APY on the farm.
pub const UNFREEZE_REWARD_RATE: &str = "317097919837645865";

/// Root configuration for the dashboard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    /// RPC endpoint and transaction settings.
    pub blockchain: BlockchainConfig,

    /// Addresses of the deployed contracts.
    pub contracts: ContractsConfig,

    /// Sequenced flow timing.
    pub flow: FlowConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u32,

    /// Gas price multiplier (1.0 = estimated, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

/// Deployed contract addresses and token metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// ERC-20 token moved by deposits and airdrops.
    pub token: String,

    /// SimpleYieldFarm staking contract.
    pub farm: String,

    /// Airdrop contract exposing `multiTransferFrom`.
    pub airdrop: String,

    /// Token decimal places.
    pub token_decimals: u8,

    /// Symbol used when printing amounts.
    pub token_symbol: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            token: "0xAEb87b6BE94f99f4f5d105FCe443F1e9202b91BE".to_string(),
            farm: "0x5Fbe833a19B46fa47133950B80C1fC2A56D8249f".to_string(),
            airdrop: "0xC9855e294DEe27E7D3f4C17AF15699bC3a80BFBA".to_string(),
            token_decimals: 18,
            token_symbol: "MTK".to_string(),
        }
    }
}

/// Timing of confirmation waits inside a flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Maximum time to wait for one transaction to confirm.
    pub confirmation_timeout_secs: u64,

    /// First receipt poll delay in milliseconds.
    pub poll_base_ms: u64,

    /// Upper bound of the receipt poll delay in milliseconds.
    pub poll_max_ms: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 120,
            poll_base_ms: 500,
            poll_max_ms: 4000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
