//! Concurrent traffic generation against one coordinator.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use ledgerlock_common::LedgerLockError;
use ledgerlock_coordinator::{TransactionCoordinator, TransactionRequest};

use crate::metrics::TrafficMetrics;

/// Shape of one traffic run.
#[derive(Debug, Clone)]
pub struct TrafficPlan {
    /// Target account.
    pub account: String,
    /// Amount applied by every transaction, as raw request text.
    pub amount: String,
    /// Concurrent workers.
    pub workers: usize,
    /// Sequential transactions per worker.
    pub per_worker: usize,
}

/// Run the plan: each worker applies its transactions sequentially, all
/// workers run concurrently against the shared coordinator.
pub async fn run(
    coordinator: Arc<TransactionCoordinator>,
    plan: &TrafficPlan,
) -> TrafficMetrics {
    let metrics = Arc::new(Mutex::new(TrafficMetrics::new()));

    let mut handles = Vec::new();
    for worker in 0..plan.workers {
        let coordinator = coordinator.clone();
        let metrics = metrics.clone();
        let request = TransactionRequest::new(plan.account.as_str(), plan.amount.as_str());
        let per_worker = plan.per_worker;

        handles.push(tokio::spawn(async move {
            for _ in 0..per_worker {
                let started = Instant::now();
                match coordinator.apply(&request).await {
                    Ok(account) => {
                        debug!(worker, balance = %account.balance, "transaction applied");
                        metrics
                            .lock()
                            .record_success(started.elapsed().as_millis() as u64);
                    }
                    Err(error) => {
                        debug!(worker, %error, "transaction failed");
                        let lock_unavailable =
                            matches!(error, LedgerLockError::LockUnavailable { .. });
                        metrics.lock().record_failure(lock_unavailable);
                    }
                }
            }
        }));
    }

    for handle in handles {
        // Worker tasks never panic; a failed join would be a simulator bug.
        let _ = handle.await;
    }

    Arc::try_unwrap(metrics)
        .map(|m| m.into_inner())
        .unwrap_or_else(|shared| shared.lock().clone())
}
