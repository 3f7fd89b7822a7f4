//! Core transaction coordinator.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use ledgerlock_common::{parse_amount, AccountId, LedgerLockError, Result};
use ledgerlock_quorum::{LockResource, QuorumLockManager};
use ledgerlock_store::{Account, LedgerStore};

use crate::config::{CoordinatorConfig, StrategyMode};

/// A request to apply an amount to an account's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Account whose balance the transaction applies to.
    pub target_account_id: AccountId,
    /// Raw amount text. Parsed strictly before any collaborator call;
    /// anything that is not a finite decimal is rejected.
    pub amount: String,
}

impl TransactionRequest {
    /// Create a new transaction request.
    pub fn new(target_account_id: impl Into<AccountId>, amount: impl Into<String>) -> Self {
        Self {
            target_account_id: target_account_id.into(),
            amount: amount.into(),
        }
    }
}

/// Applies transactions under the configured concurrency strategy.
///
/// Collaborators are built once at process startup and injected; the
/// coordinator never constructs store or lock-node connections per request.
pub struct TransactionCoordinator {
    /// The ledger store collaborator.
    store: Arc<dyn LedgerStore>,
    /// Quorum lock manager over the lock node pool.
    locks: Arc<QuorumLockManager>,
    /// Configuration.
    config: CoordinatorConfig,
}

impl TransactionCoordinator {
    /// Create a new coordinator.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        locks: Arc<QuorumLockManager>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            store,
            locks,
            config,
        }
    }

    /// Strategy this coordinator runs.
    pub fn strategy(&self) -> StrategyMode {
        self.config.strategy
    }

    /// Apply a transaction and return the updated account.
    #[instrument(skip(self, request), fields(account = %request.target_account_id, strategy = %self.config.strategy))]
    pub async fn apply(&self, request: &TransactionRequest) -> Result<Account> {
        let amount = parse_amount(&request.amount)?;
        let id = &request.target_account_id;

        let account = match self.config.strategy {
            StrategyMode::Unsafe => self.apply_unsafe(id, amount).await?,
            StrategyMode::Atomic => self.apply_atomic(id, amount).await?,
            StrategyMode::Locked => self.apply_locked(id, amount).await?,
        };

        info!(account = %account.id, balance = %account.balance, "transaction applied");
        Ok(account)
    }

    /// Read-modify-write with no coordination.
    ///
    /// Two concurrent callers can read the same balance and overwrite each
    /// other's update. Retained as the baseline the other strategies fix.
    async fn apply_unsafe(&self, id: &AccountId, amount: Decimal) -> Result<Account> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LedgerLockError::AccountNotFound(id.clone()))?;

        let new_balance = current.balance + amount;
        self.store.put(id, new_balance).await?;

        Ok(Account::new(id.clone(), new_balance))
    }

    /// One storage-level atomic add. Safe without any external lock.
    async fn apply_atomic(&self, id: &AccountId, amount: Decimal) -> Result<Account> {
        let balance = self.store.atomic_add(id, amount).await?;
        Ok(Account::new(id.clone(), balance))
    }

    /// Read-compute-write under a quorum lock on `<id>:transaction`.
    async fn apply_locked(&self, id: &AccountId, amount: Decimal) -> Result<Account> {
        let lock = self.locks.acquire(&id.transaction_lock_key()).await?;

        let result = self.locked_critical_section(id, amount, &lock).await;

        // Released on the success path and on every error path alike.
        self.locks.release(&lock).await;
        result
    }

    async fn locked_critical_section(
        &self,
        id: &AccountId,
        amount: Decimal,
        lock: &LockResource,
    ) -> Result<Account> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LedgerLockError::AccountNotFound(id.clone()))?;

        let new_balance = current.balance + amount;

        // The lock may have expired while we were reading. Committing past
        // the validity deadline could interleave with the next holder, so
        // abort instead of writing.
        if !lock.is_valid() {
            warn!(account = %id, "lock validity expired before commit, aborting");
            return Err(LedgerLockError::LockUnavailable {
                resource: lock.resource_key.clone(),
                reason: "validity expired before commit".to_string(),
            });
        }

        self.store.put(id, new_balance).await?;
        Ok(Account::new(id.clone(), new_balance))
    }
}
