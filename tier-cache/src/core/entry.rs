use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value together with the bookkeeping used to redistribute it
/// between tiers.
///
/// `created_at` is fixed at construction. `access_count` grows by one each
/// time the value is read through [`CacheEntry::value`]; enumerating or
/// inspecting an entry never touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<K, V> {
    key: K,
    value: V,
    /// Millisecond precision so the in-memory and on-disk forms agree
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    access_count: u64,
}

impl<K, V> CacheEntry<K, V> {
    /// Create a fresh entry, stamped now, never accessed
    pub fn new(key: K, value: V) -> Self {
        Self::with_metadata(key, value, Utc::now(), 0)
    }

    /// Rebuild an entry with known bookkeeping (restores, tests)
    pub fn with_metadata(key: K, value: V, created_at: DateTime<Utc>, access_count: u64) -> Self {
        Self {
            key,
            value,
            created_at: created_at.trunc_subsecs(3),
            access_count,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Read the value, counting the access
    pub fn value(&mut self) -> &V {
        self.access_count += 1;
        &self.value
    }

    /// Look at the value without counting an access
    pub fn peek(&self) -> &V {
        &self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time elapsed since creation, never negative even if the clock stepped back
    pub fn age(&self) -> Duration {
        (Utc::now() - self.created_at).to_std().unwrap_or_default()
    }
}
