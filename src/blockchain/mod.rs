//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key) + config (RPC URL, contracts)
//!     → wallet.rs (key loading, signer)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → transaction.rs (build, sign, broadcast, confirm)
//!     → gateway.rs (write capability handed to flows)
//!     → reader.rs (typed eth_call snapshots)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contracts;
pub mod gateway;
pub mod reader;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use contracts::{ContractCall, Deployment};
pub use gateway::{RpcGateway, WalletGateway, WalletSession};
pub use reader::{ContractReader, FarmSnapshot};
pub use transaction::TxBuilder;
pub use types::{BlockchainConfig, BlockchainError, ChainId, TxHandle, TxReceipt};
pub use wallet::Wallet;
