//! Farm dashboard: sequenced token-approval flows for a yield farm
//! deployment.

pub mod blockchain;
pub mod config;
pub mod flow;
pub mod observability;
pub mod resilience;
pub mod units;

pub use blockchain::{Deployment, WalletGateway};
pub use config::DashboardConfig;
pub use flow::{FlowError, TransactionStage, TransferIntent, TxSequencer};
