//! Cache Module
//!
//! Provides the two cache tiers and their composition:
//! - Memory: bounded in-process map (hot data)
//! - File: bounded one-file-per-entry store (overflow, survives restarts)
//! - Two-level: memory-first routing plus strategy-driven redistribution

use std::time::Duration;

use crate::core::{CacheEntry, Result};

pub mod file;
pub mod memory;
pub mod shared;
pub mod strategy;
pub mod two_level;

pub use file::{FileTier, FileTierConfig, entry_file_name};
pub use memory::{MemoryTier, MemoryTierConfig};
pub use shared::SharedCache;
pub use strategy::Strategy;
pub use two_level::{RebuildReport, TwoLevelCache};

/// Contract shared by each tier and by the composed cache.
///
/// Capacity is an entry count; 0 means unlimited. A full cache rejects new
/// keys (`put` returns `false`) but always accepts overwrites of keys it
/// already holds.
pub trait Cache<K, V> {
    /// Store a fresh entry for `key`, replacing any existing one
    fn put(&mut self, key: K, value: V) -> bool;

    /// Store a pre-built entry, keeping its creation time and access count
    fn put_entry(&mut self, entry: CacheEntry<K, V>) -> bool;

    /// Read a value, counting the access
    fn get(&mut self, key: &K) -> Option<V>;

    fn delete(&mut self, key: &K) -> bool;

    fn flush(&mut self);

    fn size(&self) -> usize;

    fn get_max_size(&self) -> usize;

    /// Set the capacity, truncating if the cache already holds more
    fn set_max_size(&mut self, max: i64) -> Result<()>;

    /// Snapshot every entry without counting accesses
    fn get_all(&self) -> Vec<CacheEntry<K, V>>;

    fn is_key_present(&self, key: &K) -> bool;

    fn get_age(&self, key: &K) -> Option<Duration>;

    fn get_frequency(&self, key: &K) -> Option<u64>;
}
