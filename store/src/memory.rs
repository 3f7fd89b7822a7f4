//! In-memory ledger store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;

use ledgerlock_common::{AccountId, LedgerLockError, Result};

use crate::account::Account;
use crate::store::LedgerStore;

/// In-memory ledger store.
///
/// `atomic_add` holds the map's per-key entry lock across the whole
/// read-increment-write, which makes concurrent increments on one account
/// linearizable. An optional artificial read delay widens the window
/// between a read and a subsequent write so tests can exhibit the
/// lost-update race of non-atomic callers deterministically.
pub struct MemoryStore {
    /// Balances by account.
    accounts: DashMap<AccountId, Decimal>,
    /// Artificial delay applied after each read.
    read_delay: Option<Duration>,
    /// Operation counters.
    gets: AtomicU64,
    puts: AtomicU64,
    atomic_adds: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            read_delay: None,
            gets: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            atomic_adds: AtomicU64::new(0),
        }
    }

    /// Create a store whose reads complete only after `delay`.
    pub fn with_read_delay(delay: Duration) -> Self {
        Self {
            read_delay: Some(delay),
            ..Self::new()
        }
    }

    /// Seed an account directly, bypassing the store contract.
    pub fn seed(&self, id: AccountId, balance: Decimal) {
        self.accounts.insert(id, balance);
    }

    /// Number of `get` calls served.
    pub fn get_count(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    /// Number of `put` calls served.
    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Number of `atomic_add` calls served.
    pub fn atomic_add_count(&self) -> u64 {
        self.atomic_adds.load(Ordering::Relaxed)
    }

    /// Total calls served across all operations.
    pub fn total_calls(&self) -> u64 {
        self.get_count() + self.put_count() + self.atomic_add_count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>> {
        self.gets.fetch_add(1, Ordering::Relaxed);

        // Copy the balance out before any await so no map lock is held
        // across the suspension point.
        let balance = self.accounts.get(id).map(|b| *b);

        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(balance.map(|b| Account::new(id.clone(), b)))
    }

    async fn put(&self, id: &AccountId, balance: Decimal) -> Result<Option<Account>> {
        self.puts.fetch_add(1, Ordering::Relaxed);

        let previous = self.accounts.insert(id.clone(), balance);
        debug!(account = %id, balance = %balance, "put");
        Ok(previous.map(|b| Account::new(id.clone(), b)))
    }

    async fn atomic_add(&self, id: &AccountId, delta: Decimal) -> Result<Decimal> {
        self.atomic_adds.fetch_add(1, Ordering::Relaxed);

        match self.accounts.entry(id.clone()) {
            Entry::Occupied(mut entry) => {
                let new_balance = *entry.get() + delta;
                *entry.get_mut() = new_balance;
                Ok(new_balance)
            }
            Entry::Vacant(_) => Err(LedgerLockError::AccountNotFound(id.clone())),
        }
    }
}
