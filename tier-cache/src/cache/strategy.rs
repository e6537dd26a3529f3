//! Redistribution strategies
//!
//! A strategy orders the full entry set; the head of that order is
//! privileged for the memory tier when the two-level cache rebuilds.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::{CacheEntry, CacheError};

/// Cache redistribution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Most-accessed entries go to memory
    #[default]
    FrequentToMemory,
    /// Most-accessed entries go to file (least-accessed fill memory)
    FrequentToFile,
    /// Oldest entries go to memory
    OldToMemory,
    /// Oldest entries go to file (youngest fill memory)
    OldToFile,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::FrequentToMemory,
        Strategy::FrequentToFile,
        Strategy::OldToFile,
        Strategy::OldToMemory,
    ];

    /// Ordering placing the entries this strategy privileges first.
    ///
    /// Age ordering compares creation times, so an older entry has the
    /// smaller timestamp.
    pub fn compare<K, V>(self, a: &CacheEntry<K, V>, b: &CacheEntry<K, V>) -> Ordering {
        match self {
            Self::FrequentToMemory => b.access_count().cmp(&a.access_count()),
            Self::FrequentToFile => a.access_count().cmp(&b.access_count()),
            Self::OldToMemory => a.created_at().cmp(&b.created_at()),
            Self::OldToFile => b.created_at().cmp(&a.created_at()),
        }
    }

    /// Stable sort: ties keep their incoming order
    pub fn sort<K, V>(self, entries: &mut [CacheEntry<K, V>]) {
        entries.sort_by(|a, b| self.compare(a, b));
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FrequentToMemory => "FREQUENTTOMEMORY",
            Self::FrequentToFile => "FREQUENTTOFILE",
            Self::OldToMemory => "OLDTOMEMORY",
            Self::OldToFile => "OLDTOFILE",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = CacheError;

    /// Accepts `frequent-to-memory`, `frequent_to_memory`, `FREQUENTTOMEMORY`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "frequenttomemory" => Ok(Self::FrequentToMemory),
            "frequenttofile" => Ok(Self::FrequentToFile),
            "oldtomemory" => Ok(Self::OldToMemory),
            "oldtofile" => Ok(Self::OldToFile),
            _ => Err(CacheError::Config(format!("unknown strategy: {}", s))),
        }
    }
}
