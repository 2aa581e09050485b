//! Sequenced transaction flows.
//!
//! # Data Flow
//! ```text
//! user input
//!     → intent.rs / per-flow validation (no transaction on failure)
//!     → airdrop.rs | deposit.rs | settings.rs (build a SequencedOperation)
//!     → sequencer.rs (authorization → confirmation → action → confirmation)
//!     → stage.rs (status published to subscribers)
//! ```

pub mod airdrop;
pub mod deposit;
pub mod error;
pub mod intent;
pub mod sequencer;
pub mod settings;
pub mod stage;

pub use airdrop::{AirdropFlow, AirdropOperation};
pub use deposit::{DepositOperation, FarmFlow, WithdrawAllOperation};
pub use error::FlowError;
pub use intent::{parse_recipients, TransferIntent, ValidatedTransfer};
pub use sequencer::{FlowOutcome, FlowTask, SequencedOperation, TxSequencer};
pub use settings::{SetRewardRateOperation, SettingsFlow};
pub use stage::{FlowSnapshot, TransactionStage};
