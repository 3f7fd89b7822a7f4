//! Test doubles for lock nodes.
//!
//! Shared by this crate's unit tests and by downstream integration tests,
//! which is why they live in a regular module rather than under
//! `#[cfg(test)]`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::node::{LockNode, NodeUnavailable};

/// Node that refuses every request, as an unreachable node would.
pub struct RefusingNode {
    set_calls: AtomicU64,
}

impl RefusingNode {
    /// Create a new refusing node.
    pub fn new() -> Self {
        Self {
            set_calls: AtomicU64::new(0),
        }
    }

    /// Number of `set_if_absent` calls received.
    pub fn set_calls(&self) -> u64 {
        self.set_calls.load(Ordering::Relaxed)
    }
}

impl Default for RefusingNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockNode for RefusingNode {
    async fn set_if_absent(
        &self,
        _key: &str,
        _token: Uuid,
        _ttl: Duration,
    ) -> Result<bool, NodeUnavailable> {
        self.set_calls.fetch_add(1, Ordering::Relaxed);
        Err(NodeUnavailable("connection refused".to_string()))
    }

    async fn delete_if_equals(&self, _key: &str, _token: Uuid) -> Result<bool, NodeUnavailable> {
        Err(NodeUnavailable("connection refused".to_string()))
    }
}

/// Wrapper adding fixed latency in front of an inner node.
pub struct SlowNode {
    inner: Arc<dyn LockNode>,
    latency: Duration,
}

impl SlowNode {
    /// Wrap `inner`, delaying every call by `latency`.
    pub fn new(inner: Arc<dyn LockNode>, latency: Duration) -> Self {
        Self { inner, latency }
    }
}

#[async_trait]
impl LockNode for SlowNode {
    async fn set_if_absent(
        &self,
        key: &str,
        token: Uuid,
        ttl: Duration,
    ) -> Result<bool, NodeUnavailable> {
        tokio::time::sleep(self.latency).await;
        self.inner.set_if_absent(key, token, ttl).await
    }

    async fn delete_if_equals(&self, key: &str, token: Uuid) -> Result<bool, NodeUnavailable> {
        tokio::time::sleep(self.latency).await;
        self.inner.delete_if_equals(key, token).await
    }
}

/// Event observed by a [`RecordingNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockEvent {
    /// A `set_if_absent` that took effect.
    Acquired {
        key: String,
        token: Uuid,
        at: Instant,
    },
    /// A `delete_if_equals` that deleted an entry.
    Released {
        key: String,
        token: Uuid,
        at: Instant,
    },
}

impl LockEvent {
    /// Key the event happened on.
    pub fn key(&self) -> &str {
        match self {
            LockEvent::Acquired { key, .. } | LockEvent::Released { key, .. } => key,
        }
    }
}

/// Wrapper recording effective acquisitions and releases on an inner node.
///
/// On a single node an entry exists from a successful `set_if_absent` until
/// the matching delete, so a well-behaved lock protocol produces a strictly
/// alternating acquired/released sequence per key.
pub struct RecordingNode {
    inner: Arc<dyn LockNode>,
    events: Mutex<Vec<LockEvent>>,
}

impl RecordingNode {
    /// Wrap `inner` and record its effective operations.
    pub fn new(inner: Arc<dyn LockNode>) -> Self {
        Self {
            inner,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the events observed so far.
    pub fn events(&self) -> Vec<LockEvent> {
        self.events.lock().clone()
    }

    /// Events observed on one key.
    pub fn events_for(&self, key: &str) -> Vec<LockEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.key() == key)
            .collect()
    }
}

#[async_trait]
impl LockNode for RecordingNode {
    async fn set_if_absent(
        &self,
        key: &str,
        token: Uuid,
        ttl: Duration,
    ) -> Result<bool, NodeUnavailable> {
        let written = self.inner.set_if_absent(key, token, ttl).await?;
        if written {
            self.events.lock().push(LockEvent::Acquired {
                key: key.to_string(),
                token,
                at: Instant::now(),
            });
        }
        Ok(written)
    }

    async fn delete_if_equals(&self, key: &str, token: Uuid) -> Result<bool, NodeUnavailable> {
        let deleted = self.inner.delete_if_equals(key, token).await?;
        if deleted {
            self.events.lock().push(LockEvent::Released {
                key: key.to_string(),
                token,
                at: Instant::now(),
            });
        }
        Ok(deleted)
    }
}
