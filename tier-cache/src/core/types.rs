use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;

use super::error::{CacheError, Result};

/// Bounds a key needs to live in either tier.
///
/// `Display` supplies the canonical string form hashed into the entry's
/// file name.
pub trait CacheKey: Hash + Eq + Clone + Display + Serialize + DeserializeOwned {}

impl<T> CacheKey for T where T: Hash + Eq + Clone + Display + Serialize + DeserializeOwned {}

/// Bounds a value needs to live in either tier
pub trait CacheValue: Clone + Serialize + DeserializeOwned {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned {}

/// Where a key currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Memory,
    File,
    None,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Memory => "MEMORY",
            Self::File => "FILE",
            Self::None => "NONE",
        };
        f.write_str(name)
    }
}

/// Validate a requested capacity. 0 means unlimited; negatives are rejected.
pub fn checked_capacity(max: i64) -> Result<usize> {
    usize::try_from(max).map_err(|_| CacheError::InvalidCapacity(max))
}

/// Statistics for a two-level cache
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoLevelStats {
    /// Entries currently in the memory tier
    pub memory_entries: usize,
    /// Entries currently in the file tier
    pub file_entries: usize,
    /// Memory tier capacity (0 = unlimited)
    pub memory_capacity: usize,
    /// File tier capacity (0 = unlimited)
    pub file_capacity: usize,
    /// GETs answered by the memory tier
    pub hits_memory: u64,
    /// GETs answered by the file tier
    pub hits_file: u64,
    /// GETs answered by neither tier
    pub misses: u64,
    /// Strategy rebuilds performed
    pub rebuilds: u64,
}

impl TwoLevelStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits_memory + self.hits_file;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
