// Two-Level Cache Integration Tests
// Routing across tiers, capacity handling and strategy rebuilds

use chrono::{TimeDelta, Utc};
use std::collections::HashSet;
use tempfile::TempDir;
use tier_cache::{
    Cache, CacheConfig, CacheEntry, CacheError, FileTierConfig, Location, MemoryTierConfig,
    Strategy, TwoLevelCache,
};

fn open_cache(dir: &TempDir, memory: usize, file: usize) -> TwoLevelCache<String, String> {
    TwoLevelCache::new(&CacheConfig {
        memory: MemoryTierConfig {
            max_entries: memory,
        },
        file: FileTierConfig {
            directory: dir.path().join(".cache"),
            max_entries: file,
        },
        ..Default::default()
    })
}

fn fill(cache: &mut TwoLevelCache<String, String>, count: usize) {
    for i in 0..count {
        assert!(cache.put(i.to_string(), format!("string with value {}", i)));
    }
}

fn memory_keys(cache: &TwoLevelCache<String, String>) -> HashSet<String> {
    (0..cache.size() * 2)
        .map(|i| i.to_string())
        .filter(|k| cache.get_location(k) == Location::Memory)
        .collect()
}

#[test]
fn test_150_entries_frequent_to_memory() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 50, 100);
    fill(&mut cache, 150);
    assert_eq!(cache.size(), 150);
    assert_eq!(cache.memory().size(), 50);
    assert_eq!(cache.file().size(), 100);

    // Keys 100..150 start on disk and become the most accessed
    for i in 50..150 {
        cache.get(&i.to_string());
    }
    for i in 100..150 {
        cache.get(&i.to_string());
    }

    let report = cache.set_strategy(Strategy::FrequentToMemory);
    assert!(report.is_lossless());
    assert_eq!(report.memory, 50);
    assert_eq!(report.file, 100);
    assert_eq!(cache.size(), 150);

    let expected: HashSet<String> = (100..150).map(|i| i.to_string()).collect();
    assert_eq!(memory_keys(&cache), expected);
    for key in &expected {
        assert_eq!(cache.get_frequency(key), Some(2));
    }
}

#[test]
fn test_frequent_to_file_keeps_least_accessed_in_memory() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 50, 100);
    fill(&mut cache, 150);

    // Everything but 100..150 is read at least once
    for i in 0..100 {
        cache.get(&i.to_string());
    }

    cache.set_strategy(Strategy::FrequentToFile);

    let expected: HashSet<String> = (100..150).map(|i| i.to_string()).collect();
    assert_eq!(memory_keys(&cache), expected);
    assert_eq!(cache.memory().size(), 50);
    assert_eq!(cache.file().size(), 100);
}

#[test]
fn test_age_strategies() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 3, 0);
    let now = Utc::now();
    for i in 0..10 {
        let entry = CacheEntry::with_metadata(
            i.to_string(),
            format!("value {}", i),
            now - TimeDelta::seconds(i),
            0,
        );
        assert!(cache.put_entry(entry));
    }

    cache.set_strategy(Strategy::OldToMemory);
    let oldest: HashSet<String> = ["7", "8", "9"].iter().map(|s| s.to_string()).collect();
    assert_eq!(memory_keys(&cache), oldest);

    cache.set_strategy(Strategy::OldToFile);
    let youngest: HashSet<String> = ["0", "1", "2"].iter().map(|s| s.to_string()).collect();
    assert_eq!(memory_keys(&cache), youngest);

    assert_eq!(cache.size(), 10);
    assert!(cache.get_age(&"9".to_string()).unwrap().as_secs() >= 9);
}

#[test]
fn test_rebuild_keeps_total_for_every_strategy() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 4, 8);
    fill(&mut cache, 12);
    for i in (0..12).step_by(3) {
        cache.get(&i.to_string());
    }

    for strategy in Strategy::ALL {
        let before = cache.size();
        let report = cache.set_strategy(strategy);
        assert_eq!(cache.strategy(), strategy);
        assert_eq!(cache.size(), before);
        assert_eq!(report.memory + report.file, before);
        assert_eq!(cache.memory().size(), 4);
    }

    // Frequencies survive the moves
    assert_eq!(cache.get_frequency(&"3".to_string()), Some(1));
    assert_eq!(cache.get_frequency(&"4".to_string()), Some(0));
}

#[test]
fn test_unlimited_memory_rebuild_moves_everything_to_memory() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 5, 0);
    fill(&mut cache, 20);
    assert_eq!(cache.file().size(), 15);

    cache.set_max_size_memory_cache(0).unwrap();
    cache.apply_strategy();

    assert_eq!(cache.memory().size(), 20);
    assert_eq!(cache.file().size(), 0);
}

#[test]
fn test_get_increments_access_count_by_one() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 1, 0);
    cache.put("mem".into(), "m".into());
    cache.put("disk".into(), "d".into());

    for key in ["mem", "disk"] {
        let key = key.to_string();
        let before = cache.get_frequency(&key).unwrap();
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.get_frequency(&key), Some(before + 1));
    }
}

#[test]
fn test_get_all_does_not_touch_counts() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 2, 0);
    fill(&mut cache, 4);
    cache.get(&"1".to_string());
    cache.get(&"3".to_string());

    let first: Vec<u64> = cache.get_all().iter().map(|e| e.access_count()).collect();
    let second: Vec<u64> = cache.get_all().iter().map(|e| e.access_count()).collect();
    assert_eq!(first, second);
    assert_eq!(first.iter().sum::<u64>(), 2);
}

#[test]
fn test_repeated_put_keeps_size() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 1, 2);
    for _ in 0..3 {
        cache.put("a".into(), "same".into());
        cache.put("b".into(), "same".into());
    }
    assert_eq!(cache.size(), 2);
}

#[test]
fn test_negative_capacity_rejected_everywhere() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 3, 4);

    assert!(matches!(
        cache.set_max_size(-1),
        Err(CacheError::InvalidCapacity(-1))
    ));
    assert!(cache.set_max_size_memory_cache(-1).is_err());
    assert!(cache.set_max_size_file_cache(-1).is_err());
    assert_eq!(cache.get_max_size_memory_cache(), 3);
    assert_eq!(cache.get_max_size_file_cache(), 4);
}

#[test]
fn test_absent_key() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 1, 1);
    let key = "ghost".to_string();

    assert_eq!(cache.get(&key), None);
    assert_eq!(cache.get_location(&key), Location::None);
    assert_eq!(cache.get_age(&key), None);
    assert!(!cache.is_key_present(&key));
}

#[test]
fn test_file_tier_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut cache = open_cache(&dir, 1, 0);
        fill(&mut cache, 3);
        cache.get(&"2".to_string());
    }

    let mut cache = open_cache(&dir, 1, 0);
    assert_eq!(cache.memory().size(), 0);
    assert_eq!(cache.file().size(), 2);
    assert_eq!(cache.get_location(&"2".to_string()), Location::File);
    assert_eq!(cache.get_frequency(&"2".to_string()), Some(1));
    assert_eq!(
        cache.get(&"1".to_string()),
        Some("string with value 1".to_string())
    );
}

#[test]
fn test_flush_and_delete() {
    let dir = TempDir::new().unwrap();
    let mut cache = open_cache(&dir, 2, 0);
    fill(&mut cache, 5);

    assert!(cache.delete(&"0".to_string()));
    assert!(cache.delete(&"4".to_string()));
    assert!(!cache.delete(&"4".to_string()));
    assert_eq!(cache.size(), 3);

    cache.flush();
    assert_eq!(cache.size(), 0);
    assert!(cache.get_all().is_empty());
}
