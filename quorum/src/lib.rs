//! LedgerLock Quorum Locks
//!
//! Majority-quorum distributed locking over a pool of independent lock
//! nodes. A lock is considered held only when `floor(N/2) + 1` nodes
//! acknowledge it within a drift-adjusted validity window; the pool is the
//! sole coordination point, no in-process state is shared between manager
//! instances.

pub mod config;
pub mod manager;
pub mod node;
pub mod resource;
pub mod testing;

pub use config::LockConfig;
pub use manager::QuorumLockManager;
pub use node::{LockNode, MemoryLockNode, NodeUnavailable};
pub use resource::LockResource;
