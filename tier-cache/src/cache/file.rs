//! File Tier
//!
//! Persistent cache tier storing one bincode-encoded entry per file.
//! A file is named by the lowercase hex SHA-1 of the key's string form,
//! so any key maps to a fixed-length, filesystem-safe name.
//!
//! The directory is assumed to belong to a single tier instance. Nothing
//! locks the read-increment-rewrite sequence performed by `get`, so two
//! tiers (or threads) sharing a directory race with each other.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::Cache;
use crate::core::{CacheEntry, CacheError, CacheKey, CacheValue, Result, checked_capacity};

/// Length of a hex-encoded SHA-1 digest
const ENTRY_NAME_LEN: usize = 40;

/// File tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTierConfig {
    pub directory: PathBuf,
    /// Maximum number of entry files (0 = unlimited)
    pub max_entries: usize,
}

impl Default for FileTierConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(".cache"),
            max_entries: 0,
        }
    }
}

/// Name of the file holding the entry for a key's canonical string form
pub fn entry_file_name(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

fn is_entry_file_name(name: &str) -> bool {
    name.len() == ENTRY_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// File-backed cache tier.
///
/// Construction never fails: if the directory cannot be created the tier is
/// left unavailable and every later operation reports failure.
pub struct FileTier<K, V> {
    directory: PathBuf,
    max_size: usize,
    available: bool,
    _entries: PhantomData<fn() -> (K, V)>,
}

impl<K: CacheKey, V: CacheValue> FileTier<K, V> {
    /// Open (creating if needed) a file tier in the configured directory
    pub fn new(config: &FileTierConfig) -> Self {
        let available = match fs::create_dir_all(&config.directory) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "File tier directory {:?} unavailable, tier disabled: {}",
                    config.directory, e
                );
                false
            }
        };

        let mut tier = Self {
            directory: config.directory.clone(),
            max_size: 0,
            available,
            _entries: PhantomData,
        };

        if available {
            info!("File tier opened at {:?}", tier.directory);
        }
        tier.apply_capacity(config.max_entries);
        tier
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether the cache directory could be created
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Path of the file that does or would hold `key`
    pub fn entry_path(&self, key: &K) -> PathBuf {
        self.directory.join(entry_file_name(&key.to_string()))
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(CacheError::DirectoryUnavailable(self.directory.clone()))
        }
    }

    /// Entry files in lexicographic name order
    fn list_entry_files(&self) -> Result<Vec<PathBuf>> {
        self.ensure_available()?;

        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.directory)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            let name = dir_entry.file_name();
            if name.to_str().is_some_and(is_entry_file_name) {
                files.push(dir_entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Number of entry files, or why they could not be counted
    pub fn try_size(&self) -> Result<usize> {
        self.list_entry_files().map(|files| files.len())
    }

    fn read_entry(path: &Path) -> Result<CacheEntry<K, V>> {
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Write through a sibling temp file so a live name never holds a partial entry
    fn write_entry(path: &Path, entry: &CacheEntry<K, V>) -> Result<()> {
        let bytes = bincode::serialize(entry)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &bytes)?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Load the stored entry for `key` without counting an access
    fn load(&self, key: &K) -> Result<Option<CacheEntry<K, V>>> {
        self.ensure_available()?;

        let path = self.entry_path(key);
        if !path.is_file() {
            return Ok(None);
        }

        let entry = Self::read_entry(&path)?;
        if entry.key() != key {
            warn!("File tier hash collision at {:?}, treating as miss", path);
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Store an entry; `Ok(false)` means the tier is full and the key is new
    pub fn try_put_entry(&mut self, entry: &CacheEntry<K, V>) -> Result<bool> {
        self.ensure_available()?;

        let path = self.entry_path(entry.key());
        if !path.is_file() && self.max_size > 0 && self.try_size()? >= self.max_size {
            debug!("File tier full ({}), rejecting new key", self.max_size);
            return Ok(false);
        }

        Self::write_entry(&path, entry)?;
        Ok(true)
    }

    /// Read a value, persisting the incremented access count
    pub fn try_get(&mut self, key: &K) -> Result<Option<V>> {
        let Some(mut entry) = self.load(key)? else {
            return Ok(None);
        };

        let value = entry.value().clone();
        Self::write_entry(&self.entry_path(key), &entry)?;
        Ok(Some(value))
    }

    pub fn try_delete(&mut self, key: &K) -> Result<bool> {
        self.ensure_available()?;

        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every entry file past the first `keep`, in listing order
    fn remove_files_after(&self, keep: usize) -> Result<usize> {
        let mut removed = 0;
        for path in self.list_entry_files()?.iter().skip(keep) {
            match fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove cache file {:?}: {}", path, e),
            }
        }
        Ok(removed)
    }

    fn apply_capacity(&mut self, max: usize) {
        self.max_size = max;

        if max == 0 || !self.available {
            return;
        }

        match self.remove_files_after(max) {
            Ok(0) => {}
            Ok(removed) => debug!("File tier truncated {} entries to fit {}", removed, max),
            Err(e) => warn!("File tier truncation failed: {}", e),
        }
    }
}

impl<K: CacheKey, V: CacheValue> Cache<K, V> for FileTier<K, V> {
    fn put(&mut self, key: K, value: V) -> bool {
        self.put_entry(CacheEntry::new(key, value))
    }

    fn put_entry(&mut self, entry: CacheEntry<K, V>) -> bool {
        self.try_put_entry(&entry).unwrap_or_else(|e| {
            warn!("File tier put failed: {}", e);
            false
        })
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.try_get(key).unwrap_or_else(|e| {
            warn!("File tier get failed: {}", e);
            None
        })
    }

    fn delete(&mut self, key: &K) -> bool {
        self.try_delete(key).unwrap_or_else(|e| {
            warn!("File tier delete failed: {}", e);
            false
        })
    }

    fn flush(&mut self) {
        if let Err(e) = self.remove_files_after(0) {
            warn!("File tier flush failed: {}", e);
        }
    }

    fn size(&self) -> usize {
        self.try_size().unwrap_or_else(|e| {
            warn!("File tier size unavailable: {}", e);
            0
        })
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
        let files = match self.list_entry_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("File tier listing failed: {}", e);
                return Vec::new();
            }
        };

        files
            .iter()
            .filter_map(|path| match Self::read_entry(path) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable cache file {:?}: {}", path, e);
                    None
                }
            })
            .collect()
    }

    fn is_key_present(&self, key: &K) -> bool {
        self.available && self.entry_path(key).is_file()
    }

    fn get_age(&self, key: &K) -> Option<Duration> {
        self.load(key).ok().flatten().map(|entry| entry.age())
    }

    fn get_frequency(&self, key: &K) -> Option<u64> {
        self.load(key)
            .ok()
            .flatten()
            .map(|entry| entry.access_count())
    }
}
