//! Tier Cache demo driver
//!
//! Fills a two-level cache with generated entries, reads a random subset
//! to skew access counts, then applies redistribution strategies and shows
//! where every entry ended up.

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use std::path::PathBuf;
use tier_cache::{Cache, CacheConfig, Strategy, TwoLevelCache};
use tracing::info;

#[derive(Parser)]
#[command(name = "tier-cache")]
#[command(about = "Exercise a memory-over-disk cache and its redistribution strategies", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache directory for the file tier
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Memory tier capacity (default 50, or the configured value)
    #[arg(short, long)]
    memory: Option<i64>,

    /// File tier capacity (default 100, or the configured value)
    #[arg(short, long)]
    file: Option<i64>,

    /// Number of entries to insert
    #[arg(short, long, default_value_t = 150)]
    entries: usize,

    /// Apply only this strategy (default: all four in turn)
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Print cache statistics as JSON at the end
    #[arg(long)]
    stats: bool,
}

fn init_tracing(config: &CacheConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn print_cache(cache: &TwoLevelCache<String, String>, title: &str) {
    println!();
    println!("{}", title);

    for entry in cache.get_all() {
        let key = entry.key();
        let age = cache
            .get_age(key)
            .map_or_else(|| "-".to_string(), |age| age.as_millis().to_string());
        let frequency = cache
            .get_frequency(key)
            .map_or_else(|| "-".to_string(), |f| f.to_string());

        println!(
            "\tobject: '{}'\tlocation: '{}'\tage: {}\tfreq: {}",
            entry.peek(),
            cache.get_location(key),
            age,
            frequency
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CacheConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => CacheConfig::default(),
    };
    if let Some(dir) = cli.dir {
        config.file.directory = dir;
    }

    init_tracing(&config);
    info!("Starting tier-cache demo v{}", env!("CARGO_PKG_VERSION"));

    let (default_memory, default_file) = if cli.config.is_some() {
        (config.memory.max_entries as i64, config.file.max_entries as i64)
    } else {
        (50, 100)
    };

    let mut cache: TwoLevelCache<String, String> = TwoLevelCache::new(&config);
    cache.flush();
    cache
        .set_max_size_memory_cache(cli.memory.unwrap_or(default_memory))
        .context("Invalid memory capacity")?;
    cache
        .set_max_size_file_cache(cli.file.unwrap_or(default_file))
        .context("Invalid file capacity")?;
    info!(
        "Cache at {:?}: memory {} + file {} entries",
        cache.file().directory(),
        cache.get_max_size_memory_cache(),
        cache.get_max_size_file_cache()
    );

    for i in 0..cli.entries {
        cache.put(i.to_string(), format!("string with value {}", i));
    }
    print_cache(&cache, "list of objects:");

    let mut rng = rand::thread_rng();
    for i in 0..cli.entries {
        let key = rng.gen_range(0..=i).to_string();
        cache.get(&key);
    }
    print_cache(&cache, "list of objects after frequent use:");

    let strategies = match cli.strategy {
        Some(strategy) => vec![strategy],
        None => Strategy::ALL.to_vec(),
    };
    for strategy in strategies {
        let report = cache.set_strategy(strategy);
        print_cache(
            &cache,
            &format!("list of objects after applying cache strategy ({})", strategy),
        );
        if !report.is_lossless() {
            println!("\tdropped: {:?}", report.dropped);
        }
    }

    if cli.stats {
        println!("{}", serde_json::to_string_pretty(&cache.stats())?);
    }

    Ok(())
}
