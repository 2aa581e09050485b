//! Shared utilities for flow integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Notify};

use farm_dashboard::blockchain::contracts::ContractCall;
use farm_dashboard::blockchain::types::{BlockchainError, BlockchainResult, TxHandle, TxReceipt};
use farm_dashboard::blockchain::{Deployment, WalletGateway};
use farm_dashboard::flow::{FlowSnapshot, TxSequencer};

pub const USER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const ALICE: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const BOB: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

#[derive(Default)]
struct MockState {
    account: Option<Address>,
    submitted: Vec<ContractCall>,
    submit_failures: HashMap<String, String>,
    confirm_failures: HashMap<String, String>,
    gates: HashMap<String, Arc<Notify>>,
    handles: HashMap<TxHash, (String, u64)>,
}

/// In-memory wallet gateway that records every call it is asked to submit.
///
/// Failures and confirmation gates are keyed by function name
/// (`approve`, `multiTransferFrom`, ...).
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    pub fn connected(account: Address) -> Arc<Self> {
        let gateway = Self::default();
        gateway.state.lock().unwrap().account = Some(account);
        Arc::new(gateway)
    }

    pub fn disconnected() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `submit` fail for `function`, like a signer rejection.
    pub fn fail_submit(&self, function: &str, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .submit_failures
            .insert(function.to_string(), reason.to_string());
    }

    /// Make the confirmation of `function` resolve to a revert.
    pub fn fail_confirmation(&self, function: &str, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .confirm_failures
            .insert(function.to_string(), reason.to_string());
    }

    /// Hold confirmations of `function` until the returned notify fires.
    pub fn gate(&self, function: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(function.to_string(), notify.clone());
        notify
    }

    pub fn submitted(&self) -> Vec<ContractCall> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn submitted_functions(&self) -> Vec<String> {
        self.submitted()
            .iter()
            .map(|call| call.function_name().to_string())
            .collect()
    }
}

#[async_trait]
impl WalletGateway for MockGateway {
    fn account(&self) -> Option<Address> {
        self.state.lock().unwrap().account
    }

    async fn submit(&self, call: &ContractCall) -> BlockchainResult<TxHandle> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(call.clone());
        let function = call.function_name().to_string();

        if let Some(reason) = state.submit_failures.get(&function) {
            return Err(BlockchainError::Wallet(reason.clone()));
        }

        let nonce = state.submitted.len() as u64;
        let hash = TxHash::with_last_byte(nonce as u8);
        state.handles.insert(hash, (function, nonce));
        Ok(TxHandle(hash))
    }

    async fn wait_for_confirmation(&self, handle: &TxHandle) -> BlockchainResult<TxReceipt> {
        let (function, block_number, gate) = {
            let state = self.state.lock().unwrap();
            let (function, block_number) = state
                .handles
                .get(&handle.hash())
                .cloned()
                .ok_or_else(|| BlockchainError::Rpc(format!("unknown transaction {}", handle)))?;
            let gate = state.gates.get(&function).cloned();
            (function, block_number, gate)
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = self.state.lock().unwrap().confirm_failures.get(&function).cloned();
        match failure {
            Some(reason) => Err(BlockchainError::Reverted(reason)),
            None => Ok(TxReceipt {
                tx_hash: handle.hash(),
                block_number,
            }),
        }
    }
}

pub fn deployment() -> Deployment {
    Deployment {
        token: address!("b07ef8a5457832fF03Dfc8D5aE4402F9000180F7"),
        farm: address!("0aC15B8A5A9fF7DbC5fbf5C0bD4f6D8B3C8c4C09"),
        airdrop: address!("C9855e294DEe27E7D3f4C17AF15699bC3a80BFBA"),
        token_decimals: 18,
        token_symbol: "MTK".to_string(),
    }
}

pub fn sequencer(gateway: &Arc<MockGateway>) -> TxSequencer<MockGateway> {
    TxSequencer::new(gateway.clone())
}

/// `n` whole tokens with 18 decimals.
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

/// Wait until the published snapshot satisfies `predicate`.
pub async fn wait_for<F>(rx: &mut watch::Receiver<FlowSnapshot>, predicate: F) -> FlowSnapshot
where
    F: FnMut(&FlowSnapshot) -> bool,
{
    with_timeout(async { rx.wait_for(predicate).await.map(|snapshot| (*snapshot).clone()) })
        .await
        .expect("sequencer dropped")
}

/// Fail the test instead of hanging.
pub async fn with_timeout<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}

/// Wait until at least `count` calls reached the gateway.
pub async fn wait_submitted(gateway: &MockGateway, count: usize) {
    with_timeout(async {
        while gateway.submitted().len() < count {
            tokio::task::yield_now().await;
        }
    })
    .await
}

/// Reply of a stub JSON-RPC method: a result, or an error code and message.
pub type RpcReply = Result<Value, (i64, String)>;

/// Start a JSON-RPC node on an ephemeral port that answers each call with
/// `handler(method)`. Returns its URL.
pub async fn start_rpc_stub<F>(handler: F) -> String
where
    F: Fn(&str) -> RpcReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let Some(body) = read_request_body(&mut socket).await else {
                    return;
                };
                let Ok(request) = serde_json::from_slice::<Value>(&body) else {
                    return;
                };

                let id = request["id"].clone();
                let method = request["method"].as_str().unwrap_or_default();
                let payload = match handler(method) {
                    Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
                    Err((code, message)) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": code, "message": message },
                    }),
                };

                let body = payload.to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn read_request_body(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let start = end + 4;
            if buf.len() >= start + length {
                return Some(buf[start..start + length].to_vec());
            }
        }
    }
}
