//! Coordinator configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use ledgerlock_common::{LedgerLockError, Result};
use ledgerlock_quorum::LockConfig;

/// Concurrency strategy applied to every transaction.
///
/// A configuration-time choice: one coordinator runs one strategy, callers
/// never pick per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    /// Non-atomic read-modify-write. Loses updates under concurrent
    /// writers; kept only to exhibit the race the other strategies close.
    Unsafe,
    /// One storage-level atomic add. Lock-free, preferred whenever the
    /// store offers a genuine atomic increment.
    Atomic,
    /// Quorum lock around the read-compute-write critical section.
    Locked,
}

impl FromStr for StrategyMode {
    type Err = LedgerLockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unsafe" => Ok(StrategyMode::Unsafe),
            "atomic" => Ok(StrategyMode::Atomic),
            "locked" => Ok(StrategyMode::Locked),
            other => Err(LedgerLockError::ConfigurationError(format!(
                "unknown strategy mode: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyMode::Unsafe => "unsafe",
            StrategyMode::Atomic => "atomic",
            StrategyMode::Locked => "locked",
        };
        write!(f, "{name}")
    }
}

/// Main coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Strategy used for every transaction.
    pub strategy: StrategyMode,
    /// Quorum lock settings, used by the locked strategy.
    pub lock: LockConfig,
    /// Number of lock nodes in the pool.
    pub pool_size: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyMode::Atomic,
            lock: LockConfig::default(),
            pool_size: 5,
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(strategy) = std::env::var("LEDGERLOCK_STRATEGY") {
            if let Ok(strategy) = strategy.parse() {
                config.strategy = strategy;
            }
        }

        if let Some(ttl) = env_millis("LEDGERLOCK_LOCK_TTL_MS") {
            config.lock.ttl = ttl;
        }

        if let Some(timeout) = env_millis("LEDGERLOCK_NODE_TIMEOUT_MS") {
            config.lock.node_timeout = timeout;
        }

        if let Ok(drift) = std::env::var("LEDGERLOCK_DRIFT_FACTOR") {
            if let Ok(drift) = drift.parse() {
                config.lock.drift_factor = drift;
            }
        }

        if let Ok(count) = std::env::var("LEDGERLOCK_RETRY_COUNT") {
            if let Ok(count) = count.parse() {
                config.lock.retry_count = count;
            }
        }

        if let Some(delay) = env_millis("LEDGERLOCK_RETRY_DELAY_MS") {
            config.lock.retry_delay = delay;
        }

        if let Some(jitter) = env_millis("LEDGERLOCK_RETRY_JITTER_MS") {
            config.lock.retry_jitter = jitter;
        }

        if let Ok(size) = std::env::var("LEDGERLOCK_POOL_SIZE") {
            if let Ok(size) = size.parse() {
                config.pool_size = size;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(LedgerLockError::ConfigurationError(
                "lock node pool cannot be empty".to_string(),
            ));
        }

        self.lock.validate()
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoordinatorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_pool_rejected() {
        let config = CoordinatorConfig {
            pool_size: 0,
            ..CoordinatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategy_mode_parsing() {
        assert_eq!("unsafe".parse::<StrategyMode>().unwrap(), StrategyMode::Unsafe);
        assert_eq!("Atomic".parse::<StrategyMode>().unwrap(), StrategyMode::Atomic);
        assert_eq!("locked".parse::<StrategyMode>().unwrap(), StrategyMode::Locked);
        assert!("v2".parse::<StrategyMode>().is_err());
    }

    #[test]
    fn test_strategy_mode_display_round_trips() {
        for mode in [StrategyMode::Unsafe, StrategyMode::Atomic, StrategyMode::Locked] {
            assert_eq!(mode.to_string().parse::<StrategyMode>().unwrap(), mode);
        }
    }
}
