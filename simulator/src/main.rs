//! LedgerLock Simulator
//!
//! Drives concurrent transactions against one account through a shared
//! coordinator and checks the final balance against the expected sum, the
//! native successor of the original batch-traffic client.

use std::sync::Arc;

use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod metrics;
mod traffic;

use ledgerlock_common::{parse_amount, AccountId};
use ledgerlock_coordinator::{CoordinatorConfig, StrategyMode, TransactionCoordinator};
use ledgerlock_quorum::{LockNode, MemoryLockNode, QuorumLockManager};
use ledgerlock_store::{LedgerStore, MemoryStore};

use traffic::TrafficPlan;

/// LedgerLock traffic simulator CLI.
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Concurrent transaction traffic against one account")]
struct Args {
    /// Concurrency strategy: unsafe, atomic or locked
    #[arg(short, long, default_value = "locked")]
    strategy: String,

    /// Number of concurrent workers
    #[arg(short, long, default_value = "5")]
    workers: usize,

    /// Transactions per worker
    #[arg(short, long, default_value = "20")]
    transactions: usize,

    /// Amount applied by each transaction
    #[arg(short, long, default_value = "1")]
    amount: String,

    /// Target account id
    #[arg(long, default_value = "001")]
    account: String,

    /// Initial balance seeded into the account
    #[arg(long, default_value = "100")]
    initial_balance: String,

    /// Number of lock nodes in the pool
    #[arg(long, default_value = "5")]
    pool_size: usize,

    /// Emit the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let strategy: StrategyMode = args.strategy.parse()?;
    let initial_balance = parse_amount(&args.initial_balance)?;
    let amount = parse_amount(&args.amount)?;

    let mut config = CoordinatorConfig::from_env();
    config.strategy = strategy;
    config.pool_size = args.pool_size;
    config.validate()?;

    info!(%strategy, workers = args.workers, transactions = args.transactions, "starting traffic run");

    // Collaborators are built once and injected, never per request.
    let store = Arc::new(MemoryStore::new());
    let account_id = AccountId::new(args.account.as_str());
    store.seed(account_id.clone(), initial_balance);

    let pool: Vec<Arc<dyn LockNode>> = (0..config.pool_size)
        .map(|_| Arc::new(MemoryLockNode::new()) as Arc<dyn LockNode>)
        .collect();
    let locks = Arc::new(QuorumLockManager::new(pool, config.lock.clone()));
    let coordinator = Arc::new(TransactionCoordinator::new(
        store.clone(),
        locks,
        config,
    ));

    let plan = TrafficPlan {
        account: args.account.clone(),
        amount: args.amount.clone(),
        workers: args.workers,
        per_worker: args.transactions,
    };
    let metrics = traffic::run(coordinator, &plan).await;

    let observed = store
        .get(&account_id)
        .await?
        .map(|account| account.balance)
        .unwrap_or(Decimal::ZERO);
    let expected = initial_balance + amount * Decimal::from(metrics.succeeded);

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "strategy": strategy.to_string(),
                "metrics": metrics,
                "average_latency_ms": metrics.average_latency_ms(),
                "expected_balance": expected.to_string(),
                "observed_balance": observed.to_string(),
            })
        );
    } else {
        info!(
            total = metrics.total,
            succeeded = metrics.succeeded,
            failed = metrics.failed,
            lock_unavailable = metrics.lock_unavailable,
            average_latency_ms = metrics.average_latency_ms(),
            %expected,
            %observed,
            "traffic run finished"
        );
    }

    if observed != expected {
        if strategy == StrategyMode::Unsafe {
            info!("updates lost, as expected of the unsafe baseline");
        } else {
            anyhow::bail!(
                "{} strategy lost updates: expected {}, observed {}",
                strategy,
                expected,
                observed
            );
        }
    }

    Ok(())
}
