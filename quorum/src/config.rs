//! Quorum lock configuration.

use std::time::Duration;

use ledgerlock_common::{LedgerLockError, Result};

/// Quorum lock configuration.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Nominal lock ttl stored on each node.
    pub ttl: Duration,
    /// Per-node call timeout. Kept well below `ttl` so one slow or
    /// partitioned node cannot stall a whole acquisition attempt.
    pub node_timeout: Duration,
    /// Fraction of `ttl` set aside for clock drift between nodes.
    pub drift_factor: f64,
    /// Maximum acquisition attempts before giving up.
    pub retry_count: u32,
    /// Base delay between attempts.
    pub retry_delay: Duration,
    /// Upper bound of the random jitter added to `retry_delay`.
    pub retry_jitter: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_millis(1000),
            node_timeout: Duration::from_millis(100),
            drift_factor: 0.01,
            retry_count: 10,
            retry_delay: Duration::from_millis(200),
            retry_jitter: Duration::from_millis(100),
        }
    }
}

impl LockConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(LedgerLockError::ConfigurationError(
                "lock ttl cannot be zero".to_string(),
            ));
        }

        if self.node_timeout >= self.ttl {
            return Err(LedgerLockError::ConfigurationError(
                "node timeout must be below the lock ttl".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.drift_factor) {
            return Err(LedgerLockError::ConfigurationError(
                "drift factor must be in [0, 1)".to_string(),
            ));
        }

        if self.retry_count == 0 {
            return Err(LedgerLockError::ConfigurationError(
                "retry count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LockConfig::default().validate().is_ok());
    }

    #[test]
    fn test_node_timeout_must_stay_below_ttl() {
        let config = LockConfig {
            node_timeout: Duration::from_millis(1000),
            ..LockConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retry_count_rejected() {
        let config = LockConfig {
            retry_count: 0,
            ..LockConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
