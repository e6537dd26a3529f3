pub mod entry;
pub mod error;
pub mod types;

pub use entry::CacheEntry;
pub use error::{CacheError, Result};
pub use types::{CacheKey, CacheValue, Location, TwoLevelStats, checked_capacity};
