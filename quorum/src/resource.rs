//! Held lock resource.

use std::time::{Duration, Instant};

use uuid::Uuid;

/// A quorum lock held by a single caller.
///
/// Owned exclusively by the acquisition that created it and never shared
/// across requests. The holder must stop trusting the lock once
/// `validity_deadline` passes; the pool's ttl entries then expire on their
/// own, so even a crashed holder cannot block others permanently.
#[derive(Debug, Clone)]
pub struct LockResource {
    /// Key the lock was taken on.
    pub resource_key: String,
    /// Fencing token unique to the acquiring attempt. Release is
    /// compare-and-delete on this token, so a manager never deletes a lock
    /// it does not hold.
    pub token: Uuid,
    /// Instant after which the lock may no longer be trusted.
    pub validity_deadline: Instant,
}

impl LockResource {
    /// Check whether the lock is still within its validity window.
    pub fn is_valid(&self) -> bool {
        Instant::now() < self.validity_deadline
    }

    /// Get remaining validity.
    pub fn remaining(&self) -> Duration {
        self.validity_deadline.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_window() {
        let lock = LockResource {
            resource_key: "001:transaction".to_string(),
            token: Uuid::new_v4(),
            validity_deadline: Instant::now() + Duration::from_millis(500),
        };
        assert!(lock.is_valid());
        assert!(lock.remaining() <= Duration::from_millis(500));

        let expired = LockResource {
            validity_deadline: Instant::now() - Duration::from_millis(1),
            ..lock
        };
        assert!(!expired.is_valid());
        assert_eq!(expired.remaining(), Duration::ZERO);
    }
}
