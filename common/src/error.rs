//! Error types for LedgerLock operations.

use crate::identifiers::AccountId;
use thiserror::Error;

/// Main error type for LedgerLock operations.
#[derive(Error, Debug)]
pub enum LedgerLockError {
    /// Transaction amount failed strict numeric validation.
    #[error("Invalid amount: {input:?}")]
    InvalidAmount { input: String },

    /// Target account absent from the ledger store.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Quorum could not be reached within the retry budget, or the lock's
    /// validity expired before the critical section committed.
    #[error("Lock unavailable for {resource}: {reason}")]
    LockUnavailable { resource: String, reason: String },

    /// The ledger store collaborator failed or timed out.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LedgerLockError {
    /// Check if this error is worth retrying by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerLockError::LockUnavailable { .. } | LedgerLockError::StoreError(_)
        )
    }

    /// Get error code for wire-facing responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerLockError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerLockError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            LedgerLockError::LockUnavailable { .. } => "LOCK_UNAVAILABLE",
            LedgerLockError::StoreError(_) => "STORE_ERROR",
            LedgerLockError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for LedgerLock operations.
pub type Result<T> = std::result::Result<T, LedgerLockError>;
