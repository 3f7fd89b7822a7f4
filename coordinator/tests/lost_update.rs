//! Concurrency properties of the three strategies.
//!
//! The safe strategies must never lose an update regardless of
//! interleaving; the unsafe baseline must demonstrably lose updates once
//! the read-to-write window is widened.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use ledgerlock_common::AccountId;
use ledgerlock_coordinator::{
    CoordinatorConfig, StrategyMode, TransactionCoordinator, TransactionRequest,
};
use ledgerlock_quorum::testing::{LockEvent, RecordingNode};
use ledgerlock_quorum::{LockConfig, LockNode, MemoryLockNode, QuorumLockManager};
use ledgerlock_store::{LedgerStore, MemoryStore};

fn test_lock_config() -> LockConfig {
    LockConfig {
        ttl: Duration::from_millis(1000),
        node_timeout: Duration::from_millis(100),
        drift_factor: 0.01,
        retry_count: 50,
        retry_delay: Duration::from_millis(10),
        retry_jitter: Duration::from_millis(10),
    }
}

fn build_coordinator(
    strategy: StrategyMode,
    store: Arc<MemoryStore>,
    pool: Vec<Arc<dyn LockNode>>,
) -> Arc<TransactionCoordinator> {
    let config = CoordinatorConfig {
        strategy,
        lock: test_lock_config(),
        pool_size: pool.len(),
    };
    let locks = Arc::new(QuorumLockManager::new(pool, config.lock.clone()));
    Arc::new(TransactionCoordinator::new(store, locks, config))
}

fn memory_pool(size: usize) -> Vec<Arc<dyn LockNode>> {
    (0..size)
        .map(|_| Arc::new(MemoryLockNode::new()) as Arc<dyn LockNode>)
        .collect()
}

async fn run_concurrent(
    coordinator: Arc<TransactionCoordinator>,
    account: &str,
    workers: usize,
    per_worker: usize,
) {
    let mut handles = Vec::new();
    for _ in 0..workers {
        let coordinator = coordinator.clone();
        let request = TransactionRequest::new(account, "1");
        handles.push(tokio::spawn(async move {
            for _ in 0..per_worker {
                coordinator.apply(&request).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn atomic_mode_never_loses_updates() {
    let store = Arc::new(MemoryStore::new());
    let id = AccountId::new("001");
    store.seed(id.clone(), Decimal::ZERO);

    let coordinator = build_coordinator(StrategyMode::Atomic, store.clone(), memory_pool(3));
    run_concurrent(coordinator, "001", 8, 25).await;

    let account = store.get(&id).await.unwrap().unwrap();
    assert_eq!(account.balance, Decimal::from(200));
}

#[tokio::test]
async fn locked_mode_five_concurrent_credits() {
    // Account "001" starts at 100; five concurrent transactions of 1 must
    // land at exactly 105, with five non-overlapping lock acquisitions on
    // "001:transaction".
    let store = Arc::new(MemoryStore::new());
    let id = AccountId::new("001");
    store.seed(id.clone(), Decimal::from(100));

    let recorders: Vec<Arc<RecordingNode>> = (0..3)
        .map(|_| Arc::new(RecordingNode::new(Arc::new(MemoryLockNode::new()))))
        .collect();
    let pool: Vec<Arc<dyn LockNode>> = recorders
        .iter()
        .map(|node| node.clone() as Arc<dyn LockNode>)
        .collect();

    let coordinator = build_coordinator(StrategyMode::Locked, store.clone(), pool);
    run_concurrent(coordinator, "001", 5, 1).await;

    let account = store.get(&id).await.unwrap().unwrap();
    assert_eq!(account.balance, Decimal::from(105));

    // On any single node, acquisitions and releases strictly alternate: an
    // entry exists from set to delete, so holders never overlapped there.
    for recorder in &recorders {
        let events = recorder.events_for("001:transaction");
        assert_eq!(events.len() % 2, 0);
        for pair in events.chunks(2) {
            assert!(matches!(pair[0], LockEvent::Acquired { .. }));
            assert!(matches!(pair[1], LockEvent::Released { .. }));
        }
    }

    // Exactly five tokens reached a majority of the pool: one lock grant
    // per transaction. Failed contending attempts only ever touched a
    // minority before being rolled back.
    let mut acquired_nodes: HashMap<Uuid, HashSet<usize>> = HashMap::new();
    for (node_index, recorder) in recorders.iter().enumerate() {
        for event in recorder.events_for("001:transaction") {
            if let LockEvent::Acquired { token, .. } = event {
                acquired_nodes.entry(token).or_default().insert(node_index);
            }
        }
    }
    let grants = acquired_nodes
        .values()
        .filter(|nodes| nodes.len() >= 2)
        .count();
    assert_eq!(grants, 5);
}

#[tokio::test]
async fn locked_mode_survives_heavier_contention() {
    let store = Arc::new(MemoryStore::new());
    let id = AccountId::new("001");
    store.seed(id.clone(), Decimal::from(100));

    let coordinator = build_coordinator(StrategyMode::Locked, store.clone(), memory_pool(5));
    run_concurrent(coordinator, "001", 4, 5).await;

    let account = store.get(&id).await.unwrap().unwrap();
    assert_eq!(account.balance, Decimal::from(120));
}

#[tokio::test]
async fn unsafe_mode_loses_updates_under_concurrency() {
    // The injected read delay holds every worker between its read and its
    // write, so all five read the initial balance before anyone writes.
    let store = Arc::new(MemoryStore::with_read_delay(Duration::from_millis(50)));
    let id = AccountId::new("001");
    store.seed(id.clone(), Decimal::from(100));

    let coordinator = build_coordinator(StrategyMode::Unsafe, store.clone(), memory_pool(3));
    run_concurrent(coordinator, "001", 5, 1).await;

    let account = store.get(&id).await.unwrap().unwrap();
    assert!(
        account.balance < Decimal::from(105),
        "expected lost updates, got balance {}",
        account.balance
    );
}
