//! Thread-safe handle over a [`TwoLevelCache`].
//!
//! The tiers are single-threaded. `SharedCache` serializes every operation
//! behind one mutex so a cache can be shared across threads when callers
//! need that.

use parking_lot::Mutex;
use std::sync::Arc;

use super::{Cache, RebuildReport, Strategy, TwoLevelCache};
use crate::core::{CacheKey, CacheValue, Location, TwoLevelStats};

pub struct SharedCache<K, V> {
    inner: Arc<Mutex<TwoLevelCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: CacheKey, V: CacheValue> SharedCache<K, V> {
    pub fn new(cache: TwoLevelCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Run `f` with exclusive access, for sequences that must not interleave
    pub fn with<R>(&self, f: impl FnOnce(&mut TwoLevelCache<K, V>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut *cache)
    }

    pub fn put(&self, key: K, value: V) -> bool {
        self.inner.lock().put(key, value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    pub fn delete(&self, key: &K) -> bool {
        self.inner.lock().delete(key)
    }

    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn get_location(&self, key: &K) -> Location {
        self.inner.lock().get_location(key)
    }

    pub fn set_strategy(&self, strategy: Strategy) -> RebuildReport<K> {
        self.inner.lock().set_strategy(strategy)
    }

    pub fn stats(&self) -> TwoLevelStats {
        self.inner.lock().stats()
    }
}
