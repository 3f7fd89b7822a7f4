//! Lock node contract and in-memory node.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

/// Error raised by an individual lock node.
///
/// Never escalated past the manager: during acquisition a failing node only
/// reduces the acknowledgment count, during release the failure is logged
/// and absorbed.
#[derive(Debug, Error)]
#[error("lock node unavailable: {0}")]
pub struct NodeUnavailable(pub String);

/// Contract each lock node in the pool must satisfy.
///
/// A node is a set-if-not-exists-with-expiry / compare-and-delete pair over
/// its own independent storage. Nodes never talk to each other; mutual
/// exclusion comes from the manager requiring a majority of them.
#[async_trait]
pub trait LockNode: Send + Sync {
    /// Store `token` under `key` only if no unexpired entry exists.
    ///
    /// Returns `true` when the entry was written, `false` when another
    /// holder's unexpired entry is in place.
    async fn set_if_absent(
        &self,
        key: &str,
        token: Uuid,
        ttl: Duration,
    ) -> Result<bool, NodeUnavailable>;

    /// Delete the entry under `key` only when it still holds `token`.
    ///
    /// Returns `true` when an entry was deleted.
    async fn delete_if_equals(&self, key: &str, token: Uuid) -> Result<bool, NodeUnavailable>;
}

/// Entry held by a node for one lock key.
#[derive(Debug, Clone, Copy)]
struct LockEntry {
    token: Uuid,
    expires_at: Instant,
}

impl LockEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory lock node with lazy ttl expiry.
///
/// An entry past its expiry is treated as absent; there is no background
/// sweeper, expiry is checked on access.
pub struct MemoryLockNode {
    entries: DashMap<String, LockEntry>,
}

impl MemoryLockNode {
    /// Create an empty node.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Current unexpired holder of `key`, if any.
    pub fn holder(&self, key: &str) -> Option<Uuid> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.token)
    }
}

impl Default for MemoryLockNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockNode for MemoryLockNode {
    async fn set_if_absent(
        &self,
        key: &str,
        token: Uuid,
        ttl: Duration,
    ) -> Result<bool, NodeUnavailable> {
        let entry = LockEntry {
            token,
            expires_at: Instant::now() + ttl,
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(entry);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(true)
            }
        }
    }

    async fn delete_if_equals(&self, key: &str, token: Uuid) -> Result<bool, NodeUnavailable> {
        let removed = self
            .entries
            .remove_if(key, |_, entry| entry.token == token)
            .is_some();
        Ok(removed)
    }
}
