//! Wallet gateway: the write capability flows are driven through.
//!
//! Flows never touch providers or keys directly. They receive a
//! [`WalletGateway`] that knows the connected account, can submit a
//! [`ContractCall`] and can wait for a submitted transaction to resolve.
//! [`RpcGateway`] is the JSON-RPC implementation; tests inject fakes.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::blockchain::contracts::ContractCall;
use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationStatus, TxHandle, TxReceipt,
};
use crate::config::FlowConfig;

/// Externally owned wallet state. Flows observe it and never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletSession {
    pub account: Option<Address>,
    pub chain_id: u64,
}

/// Port for submitting contract writes on behalf of the connected account.
#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Account that signs submitted calls, if one is connected.
    fn account(&self) -> Option<Address>;

    /// Encode, sign and broadcast a call. Resolves as soon as the
    /// transaction is accepted by the node.
    async fn submit(&self, call: &ContractCall) -> BlockchainResult<TxHandle>;

    /// Resolve a submitted transaction to its receipt, or to the reason it
    /// failed (revert, timeout, RPC error).
    async fn wait_for_confirmation(&self, handle: &TxHandle) -> BlockchainResult<TxReceipt>;
}

/// Gateway backed by a local key and a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcGateway {
    builder: TxBuilder,
    flow: FlowConfig,
}

impl RpcGateway {
    pub fn new(builder: TxBuilder, flow: FlowConfig) -> Self {
        Self { builder, flow }
    }
}

#[async_trait]
impl WalletGateway for RpcGateway {
    fn account(&self) -> Option<Address> {
        Some(self.builder.address())
    }

    async fn submit(&self, call: &ContractCall) -> BlockchainResult<TxHandle> {
        let data = call.encode()?;
        let tx = self.builder.build(call.target, data).await?;
        let tx_hash = self.builder.sign_and_send(tx).await?;

        metrics::counter!("tx_submitted_total", "function" => call.function_name().to_string())
            .increment(1);
        tracing::info!(
            tx_hash = %tx_hash,
            target = %call.target,
            function = call.function_name(),
            "Call submitted"
        );

        Ok(TxHandle(tx_hash))
    }

    async fn wait_for_confirmation(&self, handle: &TxHandle) -> BlockchainResult<TxReceipt> {
        match self.builder.wait_for_confirmation(handle.hash(), &self.flow).await? {
            ConfirmationStatus::Confirmed { block_number } => Ok(TxReceipt {
                tx_hash: handle.hash(),
                block_number,
            }),
            ConfirmationStatus::Failed(reason) => Err(BlockchainError::Reverted(reason)),
        }
    }
}
