// crates/core/src/cache.rs
//! Time-to-live memoization for derived reads.
//!
//! The cache is keyed by string and stores type-erased `Arc` values with an
//! absolute expiry taken from an injected [`Clock`]. A lookup at or after
//! the expiry recomputes; there is no other eviction.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Used to drive TTL expiry and
/// 30-day windows deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at_ms: i64,
}

/// Process-wide memoization layer shared by the aggregator.
pub struct TtlCache {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key` if it has not expired, otherwise
    /// run `compute`, store its result for `ttl`, and return it.
    ///
    /// The lock is released while `compute` runs, so two callers missing at
    /// the same moment may both compute; the later store wins.
    pub fn get_or_compute<T, F>(&self, key: &str, ttl: Duration, compute: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let now = self.clock.now_ms();
        if let Some(hit) = self.lookup::<T>(key, now) {
            return hit;
        }

        let value = Arc::new(compute());
        let expires_at_ms = now.saturating_add(ttl.as_millis() as i64);
        self.lock().insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at_ms,
            },
        );
        value
    }

    fn lookup<T: Send + Sync + 'static>(&self, key: &str, now: i64) -> Option<Arc<T>> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        if now >= entry.expires_at_ms {
            return None;
        }
        // A key reused for a different type is treated as a miss.
        entry.value.clone().downcast::<T>().ok()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are plain data; a panic mid-insert cannot leave them torn.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("entries", &self.len()).finish()
    }
}
