//! Signing key for contract writes.
//!
//! The key is read from `FARM_DASHBOARD_PRIVATE_KEY` only and is never
//! logged. Nonces are not tracked here: flows are serialized and each
//! write waits for its receipt, so the chain's transaction count is always
//! the next nonce.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

pub const PRIVATE_KEY_ENV_VAR: &str = "FARM_DASHBOARD_PRIVATE_KEY";

/// Local signer bound to one chain.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl Wallet {
    /// Hex key, with or without `0x`.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key = private_key_hex.trim();
        let signer: PrivateKeySigner = key
            .strip_prefix("0x")
            .unwrap_or(key)
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), chain_id, "Signer loaded");
        Ok(Self { signer, chain_id })
    }

    pub fn from_env(chain_id: u64) -> BlockchainResult<Self> {
        let key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!("{} is not set", PRIVATE_KEY_ENV_VAR))
        })?;
        Self::from_private_key(&key, chain_id)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// EIP-155 chain id put on every request.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Signer in the form `TransactionBuilder::build` takes.
    pub fn network_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}
