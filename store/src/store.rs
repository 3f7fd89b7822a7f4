//! Ledger store contract.

use async_trait::async_trait;
use rust_decimal::Decimal;

use ledgerlock_common::{AccountId, Result};

use crate::account::Account;

/// Contract the ledger store collaborator must satisfy.
///
/// Every call is an awaitable I/O operation. `atomic_add` is the only
/// conditional primitive the store offers; no general compare-and-swap is
/// assumed available.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Point read of a single account.
    async fn get(&self, id: &AccountId) -> Result<Option<Account>>;

    /// Unconditional overwrite of an account's balance.
    ///
    /// Returns the previous account, if one existed.
    async fn put(&self, id: &AccountId, balance: Decimal) -> Result<Option<Account>>;

    /// Atomically add `delta` to the stored balance and return the new value.
    ///
    /// Linearizable with respect to concurrent `atomic_add` calls on the
    /// same id. Fails with `AccountNotFound` when the account does not
    /// exist; the increment never creates an account.
    async fn atomic_add(&self, id: &AccountId, delta: Decimal) -> Result<Decimal>;
}
