//! Two-Level Cache
//!
//! Composes the memory tier (first level) and file tier (second level)
//! behind the [`Cache`] contract. New keys land in memory while it has
//! room and overflow to disk. Entries only move between tiers when a
//! strategy rebuild re-sorts the whole set and refills both tiers.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Cache, FileTier, MemoryTier, Strategy};
use crate::config::CacheConfig;
use crate::core::{
    CacheEntry, CacheError, CacheKey, CacheValue, Location, Result, TwoLevelStats, checked_capacity,
};

/// Outcome of a strategy rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildReport<K> {
    pub strategy: Strategy,
    /// Entries placed in the memory tier
    pub memory: usize,
    /// Entries placed in the file tier
    pub file: usize,
    /// Keys that fit in neither tier and were evicted
    pub dropped: Vec<K>,
}

impl<K> RebuildReport<K> {
    fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            memory: 0,
            file: 0,
            dropped: Vec::new(),
        }
    }

    /// True when every entry found a tier
    pub fn is_lossless(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Memory-over-file cache with strategy-driven redistribution
pub struct TwoLevelCache<K, V> {
    memory: MemoryTier<K, V>,
    file: FileTier<K, V>,
    strategy: Strategy,
    hits_memory: u64,
    hits_file: u64,
    misses: u64,
    rebuilds: u64,
}

impl<K: CacheKey, V: CacheValue> TwoLevelCache<K, V> {
    /// Build both tiers from configuration. The configured strategy becomes
    /// active but is not applied until [`TwoLevelCache::apply_strategy`].
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_tiers(
            MemoryTier::with_config(&config.memory),
            FileTier::new(&config.file),
            config.strategy,
        )
    }

    pub fn with_tiers(memory: MemoryTier<K, V>, file: FileTier<K, V>, strategy: Strategy) -> Self {
        Self {
            memory,
            file,
            strategy,
            hits_memory: 0,
            hits_file: 0,
            misses: 0,
            rebuilds: 0,
        }
    }

    pub fn memory(&self) -> &MemoryTier<K, V> {
        &self.memory
    }

    pub fn file(&self) -> &FileTier<K, V> {
        &self.file
    }

    pub fn get_max_size_memory_cache(&self) -> usize {
        self.memory.get_max_size()
    }

    pub fn get_max_size_file_cache(&self) -> usize {
        self.file.get_max_size()
    }

    pub fn set_max_size_memory_cache(&mut self, max: i64) -> Result<()> {
        self.memory.set_max_size(max)
    }

    pub fn set_max_size_file_cache(&mut self, max: i64) -> Result<()> {
        self.file.set_max_size(max)
    }

    /// Which tier holds `key`; memory is checked first
    pub fn get_location(&self, key: &K) -> Location {
        if self.memory.is_key_present(key) {
            Location::Memory
        } else if self.file.is_key_present(key) {
            Location::File
        } else {
            Location::None
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Make `strategy` active and rebuild with it
    pub fn set_strategy(&mut self, strategy: Strategy) -> RebuildReport<K> {
        self.strategy = strategy;
        self.apply_strategy()
    }

    /// Re-sort every entry by the active strategy and refill the tiers.
    ///
    /// The snapshot lists memory entries before file entries, which is what
    /// breaks ties in the sort. Memory takes entries from the head of the
    /// order until it is full; the rest go to disk. Entries neither tier can
    /// take (capacities shrank since they were stored) are evicted and
    /// reported.
    pub fn apply_strategy(&mut self) -> RebuildReport<K> {
        let mut entries = self.get_all();
        self.strategy.sort(&mut entries);

        self.memory.flush();
        self.file.flush();

        let mut report = RebuildReport::new(self.strategy);
        for entry in entries {
            let key = entry.key().clone();
            match self.place(entry) {
                Location::Memory => report.memory += 1,
                Location::File => report.file += 1,
                Location::None => {
                    warn!("Rebuild ({}) found no room for key {}, evicted", self.strategy, key);
                    report.dropped.push(key);
                }
            }
        }

        self.rebuilds += 1;
        info!(
            "Applied {} strategy: {} in memory, {} on disk, {} dropped",
            self.strategy,
            report.memory,
            report.file,
            report.dropped.len()
        );
        report
    }

    /// Put a new key memory-first, overflowing to disk
    fn place(&mut self, entry: CacheEntry<K, V>) -> Location {
        match self.memory.insert(entry) {
            None => Location::Memory,
            Some(rejected) => {
                if self.file.put_entry(rejected) {
                    Location::File
                } else {
                    Location::None
                }
            }
        }
    }

    pub fn stats(&self) -> TwoLevelStats {
        TwoLevelStats {
            memory_entries: self.memory.size(),
            file_entries: self.file.size(),
            memory_capacity: self.memory.get_max_size(),
            file_capacity: self.file.get_max_size(),
            hits_memory: self.hits_memory,
            hits_file: self.hits_file,
            misses: self.misses,
            rebuilds: self.rebuilds,
        }
    }
}

impl<K: CacheKey, V: CacheValue> Cache<K, V> for TwoLevelCache<K, V> {
    fn put(&mut self, key: K, value: V) -> bool {
        self.put_entry(CacheEntry::new(key, value))
    }

    /// A key already held by a tier is overwritten in place, so no key is
    /// ever stored twice
    fn put_entry(&mut self, entry: CacheEntry<K, V>) -> bool {
        match self.get_location(entry.key()) {
            Location::Memory => self.memory.put_entry(entry),
            Location::File => self.file.put_entry(entry),
            Location::None => self.place(entry) != Location::None,
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        if let Some(value) = self.memory.get(key) {
            self.hits_memory += 1;
            debug!("Memory tier HIT for key: {}", key);
            return Some(value);
        }

        if let Some(value) = self.file.get(key) {
            self.hits_file += 1;
            debug!("File tier HIT for key: {}", key);
            return Some(value);
        }

        self.misses += 1;
        debug!("Cache MISS for key: {}", key);
        None
    }

    fn delete(&mut self, key: &K) -> bool {
        self.memory.delete(key) || self.file.delete(key)
    }

    fn flush(&mut self) {
        self.memory.flush();
        self.file.flush();
    }

    fn size(&self) -> usize {
        self.memory.size() + self.file.size()
    }

    fn get_max_size(&self) -> usize {
        self.memory.get_max_size() + self.file.get_max_size()
    }

    /// Split `max` between the tiers: half (rounded down) to memory, the
    /// rest to disk. The total must be positive.
    fn set_max_size(&mut self, max: i64) -> Result<()> {
        if max <= 0 {
            return Err(CacheError::InvalidCapacity(max));
        }
        let total = checked_capacity(max)?;
        let memory = total / 2;

        self.memory.set_max_size(memory as i64)?;
        self.file.set_max_size((total - memory) as i64)
    }

    fn get_all(&self) -> Vec<CacheEntry<K, V>> {
        let mut entries = self.memory.get_all();
        entries.extend(self.file.get_all());
        entries
    }

    fn is_key_present(&self, key: &K) -> bool {
        self.memory.is_key_present(key) || self.file.is_key_present(key)
    }

    fn get_age(&self, key: &K) -> Option<Duration> {
        self.memory.get_age(key).or_else(|| self.file.get_age(key))
    }

    fn get_frequency(&self, key: &K) -> Option<u64> {
        self.memory
            .get_frequency(key)
            .or_else(|| self.file.get_frequency(key))
    }
}
