//! In-memory key/value cache with a fixed TTL.
//!
//! Entries carry the instant they were stored. Expiry is lazy: a stale entry
//! is evicted by the read that discovers it, there is no background sweep.
//! There is no size bound.

use crate::clock::{Clock, SystemClock};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default TTL for live substance lookups (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Stored value with timestamp. Replaced wholesale, never mutated.
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) > ttl
    }
}

/// Counters describing cache activity since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Thread-safe expiring cache keyed by string.
#[derive(Debug)]
pub struct ExpiringCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone> ExpiringCache<V> {
    /// Create a cache using the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The clock entries are stamped with.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Store `value` under `key`, overwriting any prior entry.
    ///
    /// An empty key is ignored.
    pub fn set(&self, key: &str, value: V) {
        if key.is_empty() {
            return;
        }
        let entry = CacheEntry { value, stored_at: self.clock.now() };
        self.entries.insert(key.to_string(), entry);
    }

    /// Fetch the value for `key` if present and not older than the TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        if key.is_empty() {
            return None;
        }

        let now = self.clock.now();
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(now, self.ttl)).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Some(None) => {
                if self.entries.remove_if(key, |_, entry| entry.is_expired(now, self.ttl)).is_some() {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key, "evicted stale cache entry");
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Drop every entry older than the TTL. Returns the number removed.
    ///
    /// Never called implicitly.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        let removed = before.saturating_sub(self.entries.len());
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
