//! Ledger account type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use ledgerlock_common::AccountId;

/// A ledger account with its current balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: AccountId,
    /// Current balance. Equals the sum of every transaction ever
    /// successfully applied to the account.
    pub balance: Decimal,
}

impl Account {
    /// Create a new account.
    pub fn new(id: AccountId, balance: Decimal) -> Self {
        Self { id, balance }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id, self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_display() {
        let account = Account::new(AccountId::new("001"), Decimal::from(100));
        assert_eq!(account.to_string(), "001=100");
    }
}
