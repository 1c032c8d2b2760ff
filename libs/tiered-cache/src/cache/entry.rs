use std::time::Duration;

use tokio::time::Instant;

/// A stored value and the clock reading it was stored at.
///
/// Valid while `now - stored_at < ttl`. An expired entry is logically absent
/// even if it has not been swept yet.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(key: String, value: V, ttl: Duration) -> Self {
        Self {
            key,
            value,
            stored_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.ttl
            .saturating_sub(now.saturating_duration_since(self.stored_at))
    }
}
