//! Identifier types for LedgerLock entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the account ID format.
    pub fn is_valid(&self) -> bool {
        // Basic validation: non-empty, alphanumeric with underscores
        !self.0.is_empty()
            && self.0.len() <= 64
            && self.0.chars().all(|c| c.is_alphanumeric() || c == '_')
    }

    /// Key of the distributed lock guarding transactions on this account.
    pub fn transaction_lock_key(&self) -> String {
        format!("{}:transaction", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_validation() {
        assert!(AccountId::new("001").is_valid());
        assert!(AccountId::new("ACCT_42").is_valid());
        assert!(!AccountId::new("").is_valid());
        assert!(!AccountId::new("id with spaces").is_valid());
    }

    #[test]
    fn test_transaction_lock_key() {
        let id = AccountId::new("001");
        assert_eq!(id.transaction_lock_key(), "001:transaction");
    }
}
