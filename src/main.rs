//! Farm dashboard CLI.
//!
//! Operator front end for a token / yield farm / airdrop deployment.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command
//!       │
//!       ▼
//!   ┌──────────┐   validated    ┌────────────────┐  ContractCall  ┌─────────────┐
//!   │  flow::* │───operation───▶│  TxSequencer   │───────────────▶│ RpcGateway  │──▶ JSON-RPC
//!   │ airdrop  │                │ approve → wait │◀──receipts─────│ sign + poll │
//!   │ deposit  │                │ → action → wait│                └─────────────┘
//!   │ settings │                └───────┬────────┘
//!   └──────────┘                        │ watch<FlowSnapshot>
//!                                       ▼
//!                                  status lines
//! ```
//!
//! The signing key is read from `FARM_DASHBOARD_PRIVATE_KEY`.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde::Serialize;

use farm_dashboard::blockchain::{
    BlockchainClient, ContractReader, Deployment, RpcGateway, TxBuilder, Wallet,
};
use farm_dashboard::config::load_or_default;
use farm_dashboard::flow::{
    AirdropFlow, FarmFlow, FlowOutcome, FlowTask, SettingsFlow, TransferIntent, TxSequencer,
};
use farm_dashboard::observability::logging::init_logging;
use farm_dashboard::units::format_amount;

#[derive(Parser)]
#[command(name = "farm-dashboard")]
#[command(about = "Token, staking and airdrop operations for the yield farm", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show address, network and balances
    Account,
    /// Show unclaimed farm rewards
    PendingReward,
    /// Approve the airdrop contract, then send `amount` to every recipient
    Airdrop {
        /// Comma separated addresses; duplicates are paid once per entry
        #[arg(short, long)]
        recipients: String,
        /// Tokens per recipient
        #[arg(short, long)]
        amount: String,
    },
    /// Approve the farm, then deposit
    Deposit {
        #[arg(short, long)]
        amount: String,
    },
    /// Withdraw the whole stake and claim rewards
    WithdrawAll,
    /// Farm owner settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show reward rate, owner and frozen state
    Show,
    /// Set the reward rate to zero
    Freeze,
    /// Restore the reward rate to ~100% APY
    Unfreeze,
    /// Set a custom reward rate in wei per second
    SetRate { rate: String },
}

#[derive(Serialize)]
struct AccountReport {
    address: Address,
    chain_id: u64,
    native_balance: String,
    token_symbol: String,
    token_balance: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    init_logging(&config.observability);

    tracing::info!(
        rpc_url = %config.blockchain.rpc_url,
        chain_id = config.blockchain.chain_id,
        "Configuration loaded"
    );

    let deployment = Deployment::from_config(&config.contracts)?;
    let client = BlockchainClient::new(config.blockchain.clone()).await?;
    let reader = ContractReader::new(client.clone());
    let wallet = Wallet::from_env(config.blockchain.chain_id)?;
    let account = wallet.address();
    let decimals = deployment.token_decimals;

    let gateway = Arc::new(RpcGateway::new(
        TxBuilder::new(client, wallet),
        config.flow.clone(),
    ));
    let sequencer = TxSequencer::new(gateway);

    match cli.command {
        Commands::Account => {
            let (chain_id, native, token) = tokio::try_join!(
                reader.chain_id(),
                reader.native_balance(account),
                reader.token_balance(deployment.token, account),
            )?;
            let report = AccountReport {
                address: account,
                chain_id,
                native_balance: format_amount(native, 18),
                token_symbol: deployment.token_symbol.clone(),
                token_balance: format_amount(token, decimals),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Address:  {}", report.address);
                println!("Chain ID: {}", report.chain_id);
                println!("ETH:      {}", report.native_balance);
                println!("{}:      {}", report.token_symbol, report.token_balance);
            }
        }
        Commands::PendingReward => {
            let reward = reader.pending_reward(deployment.farm, account).await?;
            print_value(cli.json, "pending_reward", &format_amount(reward, 18))?;
        }
        Commands::Airdrop { recipients, amount } => {
            let balance = reader.token_balance(deployment.token, account).await?;
            let intent = TransferIntent::from_input(&recipients, &amount, decimals);
            let flow = AirdropFlow::new(sequencer.clone(), deployment);
            let task = flow.start(&intent, Some(balance))?;
            finish(&sequencer, task, cli.json).await?;
        }
        Commands::Deposit { amount } => {
            let balance = reader.token_balance(deployment.token, account).await?;
            let flow = FarmFlow::new(sequencer.clone(), deployment);
            let task = flow.deposit(&amount, Some(balance))?;
            finish(&sequencer, task, cli.json).await?;
        }
        Commands::WithdrawAll => {
            let flow = FarmFlow::new(sequencer.clone(), deployment);
            let task = flow.withdraw_all()?;
            finish(&sequencer, task, cli.json).await?;
        }
        Commands::Settings { action } => {
            let snapshot = reader.farm_snapshot(deployment.farm).await?;
            let flow = SettingsFlow::new(sequencer.clone(), deployment.farm);
            let task = match action {
                SettingsAction::Show => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    } else {
                        println!("Farm:        {}", deployment.farm);
                        println!("Owner:       {}", snapshot.owner);
                        println!(
                            "Reward rate: {} wei/sec per token{}",
                            snapshot.reward_rate,
                            if snapshot.is_frozen { " (FROZEN)" } else { "" }
                        );
                        println!("You are owner: {}", snapshot.is_owner(account));
                    }
                    return Ok(());
                }
                SettingsAction::Freeze => flow.freeze(&snapshot)?,
                SettingsAction::Unfreeze => flow.unfreeze(&snapshot)?,
                SettingsAction::SetRate { rate } => flow.set_reward_rate(&rate, &snapshot)?,
            };
            finish(&sequencer, task, cli.json).await?;
        }
    }

    Ok(())
}

/// Echo status lines until the flow ends, then report the outcome.
async fn finish(
    sequencer: &TxSequencer<RpcGateway>,
    task: FlowTask,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut updates = sequencer.subscribe();
    let printer = tokio::spawn(async move {
        let mut last = String::new();
        loop {
            let status = updates.borrow_and_update().status();
            if !status.is_empty() && status != last {
                eprintln!("{}", status);
                last = status;
            }
            if updates.borrow().stage.is_terminal() || updates.changed().await.is_err() {
                break;
            }
        }
    });

    let outcome = task.wait().await;
    // Terminal stage was published before the task resolved
    let _ = printer.await;

    report(&outcome, json)?;
    if outcome.is_success() {
        Ok(())
    } else {
        Err(format!("{} did not complete", outcome.operation).into())
    }
}

fn report(outcome: &FlowOutcome, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("Flow:   {} ({})", outcome.operation, outcome.flow_id);
    if let Some(receipt) = &outcome.authorization {
        println!("Approve: {} (block {})", receipt.tx_hash, receipt.block_number);
    }
    if let Some(receipt) = &outcome.action {
        println!("Action:  {} (block {})", receipt.tx_hash, receipt.block_number);
    }
    println!("Stage:  {}", outcome.stage.label());
    Ok(())
}

fn print_value(json: bool, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}
