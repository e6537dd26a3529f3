pub mod cache;
pub mod config;
pub mod core;

// Re-export commonly used types
pub use crate::cache::{
    Cache, FileTier, FileTierConfig, MemoryTier, MemoryTierConfig, RebuildReport, SharedCache,
    Strategy, TwoLevelCache, entry_file_name,
};
pub use crate::config::{CacheConfig, LoggingConfig};
pub use crate::core::{CacheEntry, CacheError, CacheKey, CacheValue, Location, Result, TwoLevelStats};
