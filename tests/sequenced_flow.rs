//! Approve → multiTransferFrom flows driven through an in-memory gateway.

use tokio::sync::watch;

use farm_dashboard::blockchain::contracts;
use farm_dashboard::blockchain::WalletSession;
use farm_dashboard::flow::{AirdropFlow, FlowError, TransactionStage, TransferIntent};

mod common;
use common::{
    deployment, sequencer, tokens, wait_for, wait_submitted, with_timeout, MockGateway, ALICE, BOB, USER,
};

fn recipients(list: &[alloy::primitives::Address]) -> String {
    list.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
}

#[tokio::test]
async fn test_duplicate_recipients_are_paid_per_entry() {
    let gateway = MockGateway::connected(USER);
    let deployment = deployment();
    let flow = AirdropFlow::new(sequencer(&gateway), deployment.clone());

    let intent = TransferIntent::from_input(&recipients(&[ALICE, ALICE, BOB]), "10", 18);
    let outcome = with_timeout(flow.start(&intent, None).unwrap().wait()).await;

    assert!(outcome.is_success(), "{:?}", outcome.stage);
    assert!(outcome.authorization.is_some());
    assert!(outcome.action.is_some());

    let submitted = gateway.submitted();
    assert_eq!(submitted.len(), 2);
    assert_eq!(
        submitted[0],
        contracts::approve(deployment.token, deployment.airdrop, tokens(30))
    );
    assert_eq!(
        submitted[1],
        contracts::multi_transfer_from(deployment.airdrop, &[ALICE, ALICE, BOB], &[tokens(10); 3])
    );
    assert_eq!(flow.sequencer().stage(), TransactionStage::ActionConfirmed);
    assert_eq!(flow.sequencer().status(), "airdrop succeeded");
}

#[tokio::test]
async fn test_blank_recipients_submit_nothing() {
    let gateway = MockGateway::connected(USER);
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(" , ,", "10", 18);
    let err = flow.start(&intent, None).unwrap_err();

    assert_eq!(err, FlowError::NoRecipients);
    assert_eq!(err.to_string(), "no valid addresses");
    assert!(gateway.submitted().is_empty());
    assert_eq!(flow.sequencer().stage(), TransactionStage::Idle);
}

#[tokio::test]
async fn test_invalid_amount_submits_nothing() {
    let gateway = MockGateway::connected(USER);
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "ten", 18);
    assert!(matches!(flow.start(&intent, None), Err(FlowError::Amount(_))));
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_amount_below_smallest_unit_submits_nothing() {
    let gateway = MockGateway::connected(USER);
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "0.0000000000000000001", 18);
    assert!(matches!(flow.start(&intent, None), Err(FlowError::Amount(_))));
    assert!(gateway.submitted().is_empty());
    assert_eq!(flow.sequencer().stage(), TransactionStage::Idle);
}

#[tokio::test]
async fn test_not_connected_is_refused() {
    let gateway = MockGateway::disconnected();
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "1", 18);
    assert_eq!(flow.start(&intent, None).unwrap_err(), FlowError::NotConnected);
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_total_above_balance_is_refused() {
    let gateway = MockGateway::connected(USER);
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[ALICE, ALICE, BOB]), "10", 18);
    let err = flow.start(&intent, Some(tokens(20))).unwrap_err();

    assert!(matches!(err, FlowError::InsufficientBalance { .. }));
    let message = err.to_string();
    assert!(message.starts_with("insufficient balance: need 30."), "{}", message);
    assert!(message.contains("have 20."), "{}", message);
    assert!(gateway.submitted().is_empty());

    // Exactly the balance is enough
    let task = flow.start(&intent, Some(tokens(30))).unwrap();
    assert!(with_timeout(task.wait()).await.is_success());
}

#[tokio::test]
async fn test_rejected_authorization_never_sends_action() {
    let gateway = MockGateway::connected(USER);
    gateway.fail_submit("approve", "user rejected the request");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "5", 18);
    let outcome = with_timeout(flow.start(&intent, None).unwrap().wait()).await;

    assert_eq!(gateway.submitted_functions(), vec!["approve"]);
    assert_eq!(
        outcome.stage,
        TransactionStage::Failed("Wallet error: user rejected the request".to_string())
    );
    assert!(outcome.authorization.is_none());
    assert!(outcome.action.is_none());
    assert!(!flow.sequencer().is_busy());
}

#[tokio::test]
async fn test_reverted_authorization_never_sends_action() {
    let gateway = MockGateway::connected(USER);
    gateway.fail_confirmation("approve", "execution reverted");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "5", 18);
    let outcome = with_timeout(flow.start(&intent, None).unwrap().wait()).await;

    assert_eq!(gateway.submitted_functions(), vec!["approve"]);
    assert_eq!(
        flow.sequencer().status(),
        "airdrop failed: Transaction reverted: execution reverted"
    );
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_reverted_action_keeps_authorization_receipt() {
    let gateway = MockGateway::connected(USER);
    gateway.fail_confirmation("multiTransferFrom", "ERC20: insufficient allowance");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[ALICE, BOB]), "1", 18);
    let outcome = with_timeout(flow.start(&intent, None).unwrap().wait()).await;

    assert_eq!(gateway.submitted_functions(), vec!["approve", "multiTransferFrom"]);
    assert!(outcome.authorization.is_some());
    assert!(outcome.action.is_none());
    assert!(matches!(outcome.stage, TransactionStage::Failed(ref r) if r.contains("insufficient allowance")));
}

#[tokio::test]
async fn test_stages_follow_the_sequence() {
    let gateway = MockGateway::connected(USER);
    let approve_gate = gateway.gate("approve");
    let action_gate = gateway.gate("multiTransferFrom");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());
    let mut rx = flow.sequencer().subscribe();

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "1", 18);
    let task = flow.start(&intent, None).unwrap();

    let snapshot = wait_for(&mut rx, |s| s.stage == TransactionStage::AwaitingAuthorization).await;
    assert_eq!(snapshot.status(), "Approving tokens...");
    assert_eq!(snapshot.flow_id, Some(task.id()));
    assert!(flow.sequencer().is_busy());

    // Action is not submitted while the approval is unconfirmed
    wait_submitted(&gateway, 1).await;
    tokio::task::yield_now().await;
    assert_eq!(gateway.submitted_functions(), vec!["approve"]);

    approve_gate.notify_one();
    let snapshot = wait_for(&mut rx, |s| s.stage == TransactionStage::AwaitingAction).await;
    assert_eq!(snapshot.status(), "Executing airdrop...");

    action_gate.notify_one();
    let snapshot = wait_for(&mut rx, |s| s.stage.is_terminal()).await;
    assert_eq!(snapshot.stage, TransactionStage::ActionConfirmed);

    let outcome = with_timeout(task.wait()).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_action_uses_inputs_captured_at_start() {
    let gateway = MockGateway::connected(USER);
    let approve_gate = gateway.gate("approve");
    let deployment = deployment();
    let flow = AirdropFlow::new(sequencer(&gateway), deployment.clone());
    let mut rx = flow.sequencer().subscribe();

    let mut intent = TransferIntent::from_input(&recipients(&[ALICE]), "2", 18);
    let task = flow.start(&intent, None).unwrap();
    wait_for(&mut rx, |s| s.stage == TransactionStage::AwaitingAuthorization).await;

    // The form keeps changing while the approval is pending
    intent.recipients.push(BOB.to_string());
    intent.per_recipient_amount = "99".to_string();

    approve_gate.notify_one();
    let outcome = with_timeout(task.wait()).await;
    assert!(outcome.is_success());

    assert_eq!(
        gateway.submitted()[1],
        contracts::multi_transfer_from(deployment.airdrop, &[ALICE], &[tokens(2)])
    );
}

#[tokio::test]
async fn test_start_while_busy_is_refused() {
    let gateway = MockGateway::connected(USER);
    let approve_gate = gateway.gate("approve");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());
    let mut rx = flow.sequencer().subscribe();

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "1", 18);
    let task = flow.start(&intent, None).unwrap();
    wait_for(&mut rx, |s| s.stage.is_busy()).await;

    assert_eq!(flow.start(&intent, None).unwrap_err(), FlowError::Busy);
    wait_submitted(&gateway, 1).await;
    assert_eq!(gateway.submitted().len(), 1);

    approve_gate.notify_one();
    assert!(with_timeout(task.wait()).await.is_success());
    assert_eq!(gateway.submitted().len(), 2);
}

#[tokio::test]
async fn test_restart_after_terminal_stage() {
    let gateway = MockGateway::connected(USER);
    gateway.fail_confirmation("multiTransferFrom", "execution reverted");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());

    let intent = TransferIntent::from_input(&recipients(&[BOB]), "3", 18);
    let first = with_timeout(flow.start(&intent, None).unwrap().wait()).await;
    assert!(matches!(flow.sequencer().stage(), TransactionStage::Failed(_)));

    let second = with_timeout(flow.start(&intent, None).unwrap().wait()).await;

    assert_ne!(first.flow_id, second.flow_id);
    assert_eq!(gateway.submitted().len(), 4);
    assert_ne!(
        first.authorization.map(|r| r.tx_hash),
        second.authorization.map(|r| r.tx_hash)
    );
}

#[tokio::test]
async fn test_reset_detaches_running_flow() {
    let gateway = MockGateway::connected(USER);
    let approve_gate = gateway.gate("approve");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());
    let mut rx = flow.sequencer().subscribe();

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "1", 18);
    let task = flow.start(&intent, None).unwrap();
    wait_for(&mut rx, |s| s.stage.is_busy()).await;

    flow.sequencer().reset();
    assert_eq!(flow.sequencer().stage(), TransactionStage::Idle);
    assert!(!flow.sequencer().is_busy());

    // The detached task still finishes on chain but no longer drives the view
    approve_gate.notify_one();
    let outcome = with_timeout(task.wait()).await;
    assert!(outcome.is_success());
    assert_eq!(flow.sequencer().stage(), TransactionStage::Idle);
    assert_eq!(flow.sequencer().status(), "");
}

#[tokio::test]
async fn test_wallet_change_resets_view() {
    let gateway = MockGateway::connected(USER);
    let _approve_gate = gateway.gate("approve");
    let flow = AirdropFlow::new(sequencer(&gateway), deployment());
    let mut rx = flow.sequencer().subscribe();

    let (session_tx, session_rx) = watch::channel(WalletSession {
        account: Some(USER),
        chain_id: 31337,
    });
    let _follower = flow.sequencer().follow_wallet(session_rx);

    let intent = TransferIntent::from_input(&recipients(&[ALICE]), "1", 18);
    let _task = flow.start(&intent, None).unwrap();
    wait_for(&mut rx, |s| s.stage.is_busy()).await;

    session_tx
        .send(WalletSession {
            account: Some(BOB),
            chain_id: 31337,
        })
        .unwrap();

    let snapshot = wait_for(&mut rx, |s| s.stage == TransactionStage::Idle).await;
    assert_eq!(snapshot.flow_id, None);

    // A new flow may start right away
    assert!(flow.start(&intent, None).is_ok());
}
