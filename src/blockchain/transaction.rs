//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build transactions with proper gas estimation
//! - Sign and broadcast transactions
//! - Monitor confirmations with backoff between receipt polls

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;
use crate::config::FlowConfig;
use crate::resilience::backoff::calculate_backoff;

/// Transaction builder for contract writes.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self { client, wallet }
    }

    /// Build a contract call with nonce, gas price and gas limit filled in.
    ///
    /// # Arguments
    /// * `to` - Contract address
    /// * `data` - Selector-prefixed call data
    pub async fn build(&self, to: Address, data: Bytes) -> BlockchainResult<TransactionRequest> {
        let nonce = self.client.get_transaction_count(self.wallet.address()).await?;

        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        let config = self.client.config();
        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: config.max_gas_price_gwei,
            });
        }

        let adjusted_gas_price = (gas_price as f64 * config.gas_price_multiplier) as u128;

        let tx = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(to)
            .with_input(data)
            .with_gas_price(adjusted_gas_price)
            .with_chain_id(self.wallet.chain_id());

        // Reverts surface here, before anything is signed
        let estimate = self.client.estimate_gas(&tx).await?;
        let gas_limit = estimate.saturating_add(estimate / 5);

        Ok(tx.with_nonce(nonce).with_gas_limit(gas_limit))
    }

    /// Sign a built request with the wallet key and broadcast it.
    pub async fn sign_and_send(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let envelope = tx
            .build(&self.wallet.network_wallet())
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;

        let tx_hash = self.client.send_envelope(envelope).await?;
        tracing::info!(tx_hash = %tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }

    /// Wait for a transaction to be confirmed.
    ///
    /// The block that includes the transaction counts as its first
    /// confirmation.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        flow: &FlowConfig,
    ) -> BlockchainResult<ConfirmationStatus> {
        let required_confirmations = self.client.confirmation_blocks().max(1);
        let timeout_duration = Duration::from_secs(flow.confirmation_timeout_secs);

        let result = timeout(timeout_duration, async {
            let mut attempt = 0u32;

            loop {
                attempt = attempt.saturating_add(1);
                sleep(calculate_backoff(attempt, flow.poll_base_ms, flow.poll_max_ms)).await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ConfirmationStatus::Failed(failed_receipt_reason(
                        tx_hash,
                        receipt.block_number,
                    )));
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = confirmations_at(tx_block, current_block);

                if confirmations >= required_confirmations {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(flow.confirmation_timeout_secs)),
        }
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

fn failed_receipt_reason(tx_hash: TxHash, block: Option<u64>) -> String {
    match block {
        Some(block) => format!("{} failed with status 0 in block {}", tx_hash, block),
        None => format!("{} failed with status 0", tx_hash),
    }
}

fn confirmations_at(tx_block: u64, current_block: u64) -> u32 {
    let depth = current_block.saturating_sub(tx_block).saturating_add(1);
    u32::try_from(depth).unwrap_or(u32::MAX)
}
