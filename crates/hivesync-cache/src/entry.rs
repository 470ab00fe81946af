//! Cache entry wrapper carrying its insertion time.

use std::time::{Duration, Instant};

/// A cached value together with the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub value: T,
    /// When the value was stored.
    pub cached_at: Instant,
}

impl<T> CacheEntry<T> {
    /// Wrap a value, stamping it with the current instant.
    pub fn new(value: T) -> Self {
        Self {
            value,
            cached_at: Instant::now(),
        }
    }

    /// Whether the entry's age exceeds the given TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}
