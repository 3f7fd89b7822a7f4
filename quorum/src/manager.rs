//! Quorum lock acquisition and release.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use ledgerlock_common::{LedgerLockError, Result};

use crate::config::LockConfig;
use crate::node::LockNode;
use crate::resource::LockResource;

/// Fixed drift allowance added on top of the proportional one, covering
/// node clock granularity.
const DRIFT_CONSTANT: Duration = Duration::from_millis(2);

/// Per-attempt acquisition state: the fresh token, the attempt's start
/// instant, and the indices of pool nodes that acknowledged. Discarded when
/// the attempt ends, whichever way it ends.
struct AcquisitionAttempt {
    token: Uuid,
    started: Instant,
    acknowledged: Vec<usize>,
}

impl AcquisitionAttempt {
    fn begin() -> Self {
        Self {
            token: Uuid::new_v4(),
            started: Instant::now(),
            acknowledged: Vec::new(),
        }
    }
}

/// Majority-quorum lock manager over a pool of independent lock nodes.
///
/// Manager instances share no in-process state; all coordination goes
/// through the pool. Correctness rests on the quorum protocol, not on any
/// single process's lock.
pub struct QuorumLockManager {
    /// The lock node pool, built once at startup and reused.
    nodes: Vec<Arc<dyn LockNode>>,
    /// Configuration.
    config: LockConfig,
}

impl QuorumLockManager {
    /// Create a new manager over `nodes`.
    pub fn new(nodes: Vec<Arc<dyn LockNode>>, config: LockConfig) -> Self {
        Self { nodes, config }
    }

    /// Number of nodes in the pool.
    pub fn pool_size(&self) -> usize {
        self.nodes.len()
    }

    /// Acknowledgments required for a lock to be considered held.
    pub fn quorum(&self) -> usize {
        self.nodes.len() / 2 + 1
    }

    /// Acquire a quorum lock on `resource_key`.
    ///
    /// Runs up to `retry_count` single-round attempts, sleeping
    /// `retry_delay + random(0, retry_jitter)` between them, and fails with
    /// `LockUnavailable` once the budget is exhausted. The loop is bounded;
    /// callers wanting to wait longer retry the whole call under their own
    /// deadline.
    #[instrument(skip(self))]
    pub async fn acquire(&self, resource_key: &str) -> Result<LockResource> {
        for attempt in 1..=self.config.retry_count {
            if let Some(lock) = self.try_acquire_once(resource_key).await {
                info!(
                    resource = resource_key,
                    attempt,
                    validity_ms = lock.remaining().as_millis() as u64,
                    "lock acquired"
                );
                return Ok(lock);
            }

            if attempt < self.config.retry_count {
                let jitter_ms = rand::thread_rng()
                    .gen_range(0..=self.config.retry_jitter.as_millis() as u64);
                tokio::time::sleep(self.config.retry_delay + Duration::from_millis(jitter_ms))
                    .await;
            }
        }

        warn!(
            resource = resource_key,
            attempts = self.config.retry_count,
            "lock unavailable, retry budget exhausted"
        );
        Err(LedgerLockError::LockUnavailable {
            resource: resource_key.to_string(),
            reason: format!(
                "quorum not reached within {} attempts",
                self.config.retry_count
            ),
        })
    }

    /// Release a held lock on every node in the pool, best-effort.
    ///
    /// Individual node failures are logged, never escalated; the ttl bounds
    /// the impact of an entry that could not be deleted.
    pub async fn release(&self, lock: &LockResource) {
        for (index, node) in self.nodes.iter().enumerate() {
            match timeout(
                self.config.node_timeout,
                node.delete_if_equals(&lock.resource_key, lock.token),
            )
            .await
            {
                Ok(Ok(_)) => {}
                Ok(Err(error)) => {
                    warn!(resource = %lock.resource_key, node = index, %error, "lock release failed");
                }
                Err(_) => {
                    warn!(resource = %lock.resource_key, node = index, "lock release timed out");
                }
            }
        }
        debug!(resource = %lock.resource_key, "lock released");
    }

    /// One single-round acquisition attempt across the pool.
    async fn try_acquire_once(&self, resource_key: &str) -> Option<LockResource> {
        let mut attempt = AcquisitionAttempt::begin();

        for (index, node) in self.nodes.iter().enumerate() {
            match timeout(
                self.config.node_timeout,
                node.set_if_absent(resource_key, attempt.token, self.config.ttl),
            )
            .await
            {
                Ok(Ok(true)) => attempt.acknowledged.push(index),
                Ok(Ok(false)) => {
                    debug!(resource = resource_key, node = index, "lock node occupied");
                }
                Ok(Err(error)) => {
                    debug!(resource = resource_key, node = index, %error, "lock node failed");
                }
                Err(_) => {
                    warn!(resource = resource_key, node = index, "lock node timed out");
                }
            }
        }

        // Whatever the nodes said, time spent talking to them and clock
        // drift across them eat into the usable window.
        let elapsed = attempt.started.elapsed();
        let drift = self.config.ttl.mul_f64(self.config.drift_factor) + DRIFT_CONSTANT;
        let validity = self.config.ttl.checked_sub(elapsed + drift);

        if attempt.acknowledged.len() >= self.quorum() {
            if let Some(validity) = validity.filter(|v| !v.is_zero()) {
                return Some(LockResource {
                    resource_key: resource_key.to_string(),
                    token: attempt.token,
                    validity_deadline: Instant::now() + validity,
                });
            }
        }

        self.rollback(resource_key, &attempt).await;
        None
    }

    /// Undo a failed attempt on the nodes that acknowledged it.
    async fn rollback(&self, resource_key: &str, attempt: &AcquisitionAttempt) {
        for &index in &attempt.acknowledged {
            let node = &self.nodes[index];
            match timeout(
                self.config.node_timeout,
                node.delete_if_equals(resource_key, attempt.token),
            )
            .await
            {
                Ok(Ok(_)) => {}
                Ok(Err(error)) => {
                    debug!(resource = resource_key, node = index, %error, "rollback failed");
                }
                Err(_) => {
                    debug!(resource = resource_key, node = index, "rollback timed out");
                }
            }
        }
    }
}
