//! Flow stage machine.
//!
//! # State Transitions
//! ```text
//! Idle → AwaitingAuthorization → AuthorizationConfirmed → AwaitingAction → ActionConfirmed
//!              │                                                │
//!              └──────────────→ Failed(reason) ←───────────────┘
//! ```
//!
//! Single-step operations enter at `AwaitingAction`. `ActionConfirmed` and
//! `Failed` are terminal; only a new start leaves them.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "stage", content = "reason", rename_all = "snake_case")]
pub enum TransactionStage {
    #[default]
    Idle,
    AwaitingAuthorization,
    AuthorizationConfirmed,
    AwaitingAction,
    ActionConfirmed,
    Failed(String),
}

impl TransactionStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStage::ActionConfirmed | TransactionStage::Failed(_))
    }

    /// True while transactions are outstanding; starts are refused.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            TransactionStage::AwaitingAuthorization
                | TransactionStage::AuthorizationConfirmed
                | TransactionStage::AwaitingAction
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionStage::Idle => "idle",
            TransactionStage::AwaitingAuthorization => "awaiting_authorization",
            TransactionStage::AuthorizationConfirmed => "authorization_confirmed",
            TransactionStage::AwaitingAction => "awaiting_action",
            TransactionStage::ActionConfirmed => "action_confirmed",
            TransactionStage::Failed(_) => "failed",
        }
    }
}

/// What observers of a sequencer see.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FlowSnapshot {
    pub stage: TransactionStage,
    /// Operation owning the current stage, `None` when idle.
    pub operation: Option<&'static str>,
    pub flow_id: Option<Uuid>,
}

impl FlowSnapshot {
    /// Human-readable status line.
    pub fn status(&self) -> String {
        let operation = self.operation.unwrap_or("transaction");
        match &self.stage {
            TransactionStage::Idle => String::new(),
            TransactionStage::AwaitingAuthorization => "Approving tokens...".to_string(),
            TransactionStage::AuthorizationConfirmed => "Approval confirmed".to_string(),
            TransactionStage::AwaitingAction => format!("Executing {}...", operation),
            TransactionStage::ActionConfirmed => format!("{} succeeded", operation),
            TransactionStage::Failed(reason) => format!("{} failed: {}", operation, reason),
        }
    }
}
