//! Memory tier: a bounded map of entries kept in insertion order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::Duration;
use tracing::debug;

use super::Cache;
use crate::core::{CacheEntry, Result, checked_capacity};

/// Memory tier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTierConfig {
    /// Maximum number of entries (0 = unlimited)
    pub max_entries: usize,
}

struct Slot<K, V> {
    seq: u64,
    entry: CacheEntry<K, V>,
}

/// In-process cache tier.
///
/// Entries are enumerated in the order their keys were first inserted; an
/// overwrite keeps the key's original position. Shrinking the capacity keeps
/// the earliest keys in that order and drops the rest.
pub struct MemoryTier<K, V> {
    /// Cache data
    entries: HashMap<K, Slot<K, V>>,

    /// Insertion ordering (oldest at front)
    order: BTreeMap<u64, K>,

    next_seq: u64,

    /// Maximum capacity
    max_size: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> MemoryTier<K, V> {
    /// Create an unlimited memory tier
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
            max_size: 0,
        }
    }

    pub fn with_config(config: &MemoryTierConfig) -> Self {
        let mut tier = Self::new();
        tier.apply_capacity(config.max_entries);
        tier
    }

    /// Store `entry`, handing it back if the tier is full and the key is new
    pub fn insert(&mut self, entry: CacheEntry<K, V>) -> Option<CacheEntry<K, V>> {
        if let Some(slot) = self.entries.get_mut(entry.key()) {
            slot.entry = entry;
            return None;
        }

        if self.is_full() {
            return Some(entry);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, entry.key().clone());
        self.entries.insert(entry.key().clone(), Slot { seq, entry });
        None
    }

    pub fn is_full(&self) -> bool {
        self.max_size > 0 && self.entries.len() >= self.max_size
    }

    fn entry(&self, key: &K) -> Option<&CacheEntry<K, V>> {
        self.entries.get(key).map(|slot| &slot.entry)
    }

    fn apply_capacity(&mut self, max: usize) {
        self.max_size = max;

        if max == 0 || self.entries.len() <= max {
            return;
        }

        let evicted: Vec<K> = self.order.values().skip(max).cloned().collect();
        debug!("Memory tier truncating {} entries to fit {}", evicted.len(), max);
        for key in &evicted {
            self.delete(key);
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Default for MemoryTier<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Cache<K, V> for MemoryTier<K, V> {
    fn put(&mut self, key: K, value: V) -> bool {
        self.put_entry(CacheEntry::new(key, value))
    }

    fn put_entry(&mut self, entry: CacheEntry<K, V>) -> bool {
        self.insert(entry).is_none()
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.entries
            .get_mut(key)
            .map(|slot| slot.entry.value().clone())
    }

    fn delete(&mut self, key: &K) -> bool {
        match self.entries.remove(key) {
            Some(slot) => {
                self.order.remove(&slot.seq);
                true
            }
            None => false,
        }
    }

    fn flush(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn get_max_size(&self) -> usize {
        self.max_size
    }

    fn set_max_size(&mut self, max: i64) -> Result<()> {
        let max = checked_capacity(max)?;
        self.apply_capacity(max);
        Ok(())
    }

    fn get_all(&self) -> Vec<CacheEntry<K, V>> {
        self.order
            .values()
            .filter_map(|key| self.entry(key))
            .cloned()
            .collect()
    }

    fn is_key_present(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn get_age(&self, key: &K) -> Option<Duration> {
        self.entry(key).map(CacheEntry::age)
    }

    fn get_frequency(&self, key: &K) -> Option<u64> {
        self.entry(key).map(CacheEntry::access_count)
    }
}
