#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! TTL result cache with per-key single-flight computation.
//!
//! Entries expire lazily: a lookup compares the stored creation time
//! against the TTL and recomputes on the spot when stale. There is no
//! background sweeper. Concurrent misses on the same key serialize on a
//! per-key slot lock so the compute closure runs at most once per key
//! per expiry; misses on different keys never block each other.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default time-to-live for cached values.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached value and when it was stored.
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

/// Per-key slot. Holding this lock means either reading a fresh entry
/// or being the single in-flight computation for the key.
type Slot<V> = Mutex<Option<CacheEntry<V>>>;

/// Memoizes expensive computations keyed by string, with lazy TTL
/// expiry and at-most-one-in-flight computation per key.
///
/// Stale reads within the TTL window are acceptable by contract;
/// duplicated recomputation under concurrent callers is not.
#[derive(Debug)]
pub struct ResultCache<V> {
    ttl: Duration,
    slots: Mutex<BTreeMap<String, Arc<Slot<V>>>>,
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ResultCache<V> {
    /// Creates a cache with the default 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache with a custom TTL.
    #[must_use]
    pub const fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the cached value for `key`, computing and storing it if
    /// absent or expired.
    ///
    /// The registry lock is only held long enough to find or create the
    /// key's slot; `compute` runs under the slot's own lock, so other
    /// callers for the same key wait for the result instead of
    /// recomputing, and callers for other keys proceed unhindered.
    ///
    /// # Panics
    ///
    /// Panics if a cache lock is poisoned.
    pub fn get_or_compute(&self, key: &str, compute: impl FnOnce() -> V) -> V {
        let slot = {
            let mut slots = self.slots.lock().expect("cache registry lock poisoned");
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        let mut entry = slot.lock().expect("cache slot lock poisoned");

        if let Some(cached) = entry.as_ref() {
            if cached.created_at.elapsed() < self.ttl {
                log::trace!("Cache hit for '{key}'");
                return cached.value.clone();
            }
            log::trace!("Cache entry for '{key}' expired");
        }

        let value = compute();
        *entry = Some(CacheEntry {
            value: value.clone(),
            created_at: Instant::now(),
        });
        log::debug!("Cached result for '{key}'");
        value
    }

    /// Drops every entry unconditionally. Called after the underlying
    /// record population changes.
    ///
    /// In-flight computations keep their detached slots and finish
    /// normally; their results are not re-registered.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().expect("cache registry lock poisoned");
        let dropped = slots.len();
        slots.clear();
        if dropped > 0 {
            log::debug!("Cleared {dropped} cache entries");
        }
    }

    /// Number of keys currently registered (fresh or expired).
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().expect("cache registry lock poisoned").len()
    }

    /// Whether the cache holds no keys.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
