//! LedgerLock Coordinator
//!
//! Applies credit transactions against the ledger store under one of three
//! configurable concurrency strategies: an unsafe read-modify-write
//! baseline, a lock-free storage-atomic add, and a quorum-locked critical
//! section for work spanning more than one store operation.

pub mod config;
pub mod coordinator;

pub use config::{CoordinatorConfig, StrategyMode};
pub use coordinator::{TransactionCoordinator, TransactionRequest};
