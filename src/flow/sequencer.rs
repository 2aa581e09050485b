//! Sequenced transaction flow.
//!
//! # Data Flow
//! ```text
//! start(operation)
//!     → busy check + first stage (atomic, under the watch lock)
//!     → spawned task:
//!         submit authorization → wait confirmation
//!         → build action from the operation's captured inputs
//!         → submit action → wait confirmation
//!     → FlowTask resolves with the terminal stage
//! ```
//!
//! # Design Decisions
//! - One flow per sequencer; a start while busy is refused
//! - The action is never submitted before the authorization confirms
//! - No retries and no rollback: a confirmed approval stays granted even if
//!   the action fails afterwards
//! - Submitted transactions cannot be cancelled; `reset` only detaches the
//!   view from the running task

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::contracts::ContractCall;
use crate::blockchain::gateway::{WalletGateway, WalletSession};
use crate::blockchain::types::{BlockchainResult, TxReceipt};
use crate::flow::error::FlowError;
use crate::flow::stage::{FlowSnapshot, TransactionStage};
use crate::observability::{metrics, tracing as flow_tracing};

/// A write sequence with an optional authorization step.
///
/// Implementations own copies of every input, so the action built after the
/// authorization confirms reflects what the user submitted, not what the
/// inputs hold by then.
pub trait SequencedOperation: Send + Sync + 'static {
    /// Name used in status lines, logs and metrics.
    fn name(&self) -> &'static str;

    /// Permission grant that must confirm before the action is sent.
    fn authorization(&self) -> Option<ContractCall>;

    /// The dependent call.
    fn action(&self) -> ContractCall;
}

/// Final result of one flow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowOutcome {
    pub flow_id: Uuid,
    pub operation: &'static str,
    pub stage: TransactionStage,
    pub authorization: Option<TxReceipt>,
    pub action: Option<TxReceipt>,
}

impl FlowOutcome {
    fn new(flow_id: Uuid, operation: &'static str) -> Self {
        Self {
            flow_id,
            operation,
            stage: TransactionStage::Idle,
            authorization: None,
            action: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.stage == TransactionStage::ActionConfirmed
    }
}

/// Handle on a running flow.
#[derive(Debug)]
pub struct FlowTask {
    flow_id: Uuid,
    operation: &'static str,
    handle: JoinHandle<FlowOutcome>,
}

impl FlowTask {
    pub fn id(&self) -> Uuid {
        self.flow_id
    }

    /// Wait for the flow to reach a terminal stage.
    pub async fn wait(self) -> FlowOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let mut outcome = FlowOutcome::new(self.flow_id, self.operation);
                outcome.stage = TransactionStage::Failed(format!("flow task ended abnormally: {}", e));
                outcome
            }
        }
    }
}

/// Shared view state; the running task publishes only while it still owns it.
#[derive(Debug)]
struct FlowState {
    tx: watch::Sender<FlowSnapshot>,
}

impl FlowState {
    fn publish(&self, flow_id: Uuid, stage: TransactionStage) {
        let label = stage.label();
        let published = self.tx.send_if_modified(|current| {
            if current.flow_id != Some(flow_id) {
                return false;
            }
            current.stage = stage;
            true
        });

        if published {
            tracing::info!(stage = label, "Flow stage changed");
        } else {
            tracing::debug!(stage = label, "Flow detached from view, stage not published");
        }
    }

    fn reset(&self) {
        self.tx.send_modify(|current| *current = FlowSnapshot::default());
    }
}

/// Drives [`SequencedOperation`]s through a [`WalletGateway`].
pub struct TxSequencer<G: ?Sized> {
    gateway: Arc<G>,
    state: Arc<FlowState>,
}

impl<G: ?Sized> Clone for TxSequencer<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            state: self.state.clone(),
        }
    }
}

impl<G> TxSequencer<G>
where
    G: WalletGateway + ?Sized + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        let (tx, _) = watch::channel(FlowSnapshot::default());
        Self {
            gateway,
            state: Arc::new(FlowState { tx }),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.state.tx.borrow().clone()
    }

    pub fn stage(&self) -> TransactionStage {
        self.state.tx.borrow().stage.clone()
    }

    pub fn status(&self) -> String {
        self.state.tx.borrow().status()
    }

    /// The trigger should be disabled while this is true.
    pub fn is_busy(&self) -> bool {
        self.state.tx.borrow().stage.is_busy()
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.state.tx.subscribe()
    }

    /// Return the view to `Idle`.
    ///
    /// A flow still running keeps going on chain but no longer publishes
    /// stages here, and a new flow may start.
    pub fn reset(&self) {
        self.state.reset();
    }

    /// Reset whenever the connected account or chain changes.
    pub fn follow_wallet(&self, mut session: watch::Receiver<WalletSession>) -> JoinHandle<()> {
        let state = self.state.clone();
        tokio::spawn(async move {
            let mut last = *session.borrow_and_update();
            while session.changed().await.is_ok() {
                let current = *session.borrow_and_update();
                if current != last {
                    tracing::info!(
                        account = ?current.account,
                        chain_id = current.chain_id,
                        "Wallet session changed, resetting flow view"
                    );
                    state.reset();
                    last = current;
                }
            }
        })
    }

    /// Start `operation` unless another flow is in progress.
    ///
    /// Returns once the first stage is published; submissions happen on the
    /// spawned task. Must be called inside a Tokio runtime.
    pub fn start<O: SequencedOperation>(&self, operation: O) -> Result<FlowTask, FlowError> {
        let name = operation.name();
        let authorization = operation.authorization();
        let first_stage = if authorization.is_some() {
            TransactionStage::AwaitingAuthorization
        } else {
            TransactionStage::AwaitingAction
        };
        let flow_id = flow_tracing::new_flow_id();

        let claimed = self.state.tx.send_if_modified(|current| {
            if current.stage.is_busy() {
                return false;
            }
            *current = FlowSnapshot {
                stage: first_stage,
                operation: Some(name),
                flow_id: Some(flow_id),
            };
            true
        });

        if !claimed {
            tracing::warn!(operation = name, "Flow already in progress, start refused");
            metrics::record_flow_rejected(name, FlowError::Busy.kind());
            return Err(FlowError::Busy);
        }

        metrics::record_flow_started(name);

        let gateway = self.gateway.clone();
        let state = self.state.clone();
        let span = flow_tracing::flow_span(name, flow_id);
        let handle = tokio::spawn(
            async move {
                let outcome = run(gateway.as_ref(), &state, flow_id, operation, authorization).await;
                metrics::record_flow_finished(
                    name,
                    if outcome.is_success() { "success" } else { "failed" },
                );
                outcome
            }
            .instrument(span),
        );

        Ok(FlowTask {
            flow_id,
            operation: name,
            handle,
        })
    }
}

async fn run<G, O>(
    gateway: &G,
    state: &FlowState,
    flow_id: Uuid,
    operation: O,
    authorization: Option<ContractCall>,
) -> FlowOutcome
where
    G: WalletGateway + ?Sized,
    O: SequencedOperation,
{
    let mut outcome = FlowOutcome::new(flow_id, operation.name());

    if let Some(call) = authorization {
        match submit_and_confirm(gateway, &call).await {
            Ok(receipt) => {
                outcome.authorization = Some(receipt);
                state.publish(flow_id, TransactionStage::AuthorizationConfirmed);
            }
            Err(e) => return fail(state, outcome, e.to_string()),
        }
        state.publish(flow_id, TransactionStage::AwaitingAction);
    }

    let action = operation.action();
    match submit_and_confirm(gateway, &action).await {
        Ok(receipt) => {
            outcome.action = Some(receipt);
            outcome.stage = TransactionStage::ActionConfirmed;
            state.publish(flow_id, TransactionStage::ActionConfirmed);
        }
        Err(e) => return fail(state, outcome, e.to_string()),
    }

    outcome
}

async fn submit_and_confirm<G>(gateway: &G, call: &ContractCall) -> BlockchainResult<TxReceipt>
where
    G: WalletGateway + ?Sized,
{
    let handle = gateway.submit(call).await?;
    tracing::info!(tx_hash = %handle, function = call.function_name(), "Waiting for confirmation");
    let receipt = gateway.wait_for_confirmation(&handle).await?;
    tracing::info!(
        tx_hash = %receipt.tx_hash,
        block_number = receipt.block_number,
        function = call.function_name(),
        "Transaction confirmed"
    );
    Ok(receipt)
}

fn fail(state: &FlowState, mut outcome: FlowOutcome, reason: String) -> FlowOutcome {
    tracing::warn!(reason = %reason, "Flow failed");
    outcome.stage = TransactionStage::Failed(reason.clone());
    state.publish(outcome.flow_id, TransactionStage::Failed(reason));
    outcome
}
