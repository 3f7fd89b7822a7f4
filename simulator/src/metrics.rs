//! Traffic run metrics.

use serde::Serialize;
use std::collections::VecDeque;

/// Metrics collected over one traffic run.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficMetrics {
    /// Total transactions attempted.
    pub total: u64,
    /// Transactions applied successfully.
    pub succeeded: u64,
    /// Transactions that failed.
    pub failed: u64,
    /// Failures that were lock-unavailable specifically.
    pub lock_unavailable: u64,
    /// Latency samples (ms).
    #[serde(skip)]
    latency_samples: VecDeque<u64>,
    /// Maximum samples to keep.
    #[serde(skip)]
    max_samples: usize,
}

impl TrafficMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            lock_unavailable: 0,
            latency_samples: VecDeque::with_capacity(10000),
            max_samples: 10000,
        }
    }

    /// Record a successful transaction.
    pub fn record_success(&mut self, latency_ms: u64) {
        self.total += 1;
        self.succeeded += 1;

        if self.latency_samples.len() >= self.max_samples {
            self.latency_samples.pop_front();
        }
        self.latency_samples.push_back(latency_ms);
    }

    /// Record a failed transaction.
    pub fn record_failure(&mut self, lock_unavailable: bool) {
        self.total += 1;
        self.failed += 1;
        if lock_unavailable {
            self.lock_unavailable += 1;
        }
    }

    /// Get average latency in ms.
    pub fn average_latency_ms(&self) -> u64 {
        if self.latency_samples.is_empty() {
            return 0;
        }

        let sum: u64 = self.latency_samples.iter().sum();
        sum / self.latency_samples.len() as u64
    }

    /// Get success rate.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        self.succeeded as f64 / self.total as f64
    }
}

impl Default for TrafficMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let mut metrics = TrafficMetrics::new();

        metrics.record_success(100);
        metrics.record_success(200);
        metrics.record_failure(true);
        metrics.record_failure(false);

        assert_eq!(metrics.total, 4);
        assert_eq!(metrics.succeeded, 2);
        assert_eq!(metrics.failed, 2);
        assert_eq!(metrics.lock_unavailable, 1);
        assert_eq!(metrics.average_latency_ms(), 150);
        assert_eq!(metrics.success_rate(), 0.5);
    }
}
