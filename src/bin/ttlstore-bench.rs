//! TTLSTORE Benchmark Harness
//!
//! Fills a store, measures per-key access and delete times, then runs
//! concurrent readers against a deleting writer.

use anyhow::{anyhow, Context};
use bytes::Bytes;
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use ttlstore::{Expiry, Store, StoreConfig};

/// TTLSTORE benchmark - exercises a store through its public operations
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of entries to insert
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    entries: usize,

    /// Size in bytes of the generated value
    #[arg(long, default_value_t = 1024)]
    value_size: usize,

    /// Use the contents of this file as the value instead
    #[arg(long)]
    value_file: Option<PathBuf>,

    /// Entry time-to-live in seconds (0 = never expire)
    #[arg(long, default_value_t = 5)]
    ttl_secs: u64,

    /// Concurrent reader threads (0 = number of CPUs)
    #[arg(long, default_value_t = 0)]
    readers: usize,

    /// Janitor sweep interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    sweep_interval_ms: u64,

    /// Disable the background janitor
    #[arg(long)]
    no_janitor: bool,
}

/// Access time statistics over a set of samples
#[derive(Debug, Clone, Copy, PartialEq)]
struct TimeStats {
    avg: Duration,
    std_dev: Duration,
    p95: Duration,
    p99: Duration,
    max: Duration,
}

impl TimeStats {
    fn from_samples(samples: &mut [Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let n = samples.len() as f64;
        let mean = samples.iter().map(|d| d.as_nanos() as f64).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|d| {
                let diff = d.as_nanos() as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;

        let percentile = |p: f64| {
            let idx = ((samples.len() - 1) as f64 * p).round() as usize;
            samples[idx]
        };

        Some(Self {
            avg: Duration::from_nanos(mean as u64),
            std_dev: Duration::from_nanos(variance.sqrt() as u64),
            p95: percentile(0.95),
            p99: percentile(0.99),
            max: samples[samples.len() - 1],
        })
    }
}

/// Average time per operation over `ops` operations
fn per_op(total: Duration, ops: usize) -> Duration {
    if ops == 0 {
        return Duration::ZERO;
    }
    total.div_f64(ops as f64)
}

fn key_for(i: usize) -> String {
    format!("key-{:016x}", i)
}

fn load_value(args: &Args) -> anyhow::Result<Bytes> {
    match &args.value_file {
        Some(path) => {
            let data = std::fs::read(path)
                .with_context(|| format!("reading value file {}", path.display()))?;
            Ok(Bytes::from(data))
        }
        None => Ok(Bytes::from(vec![0xAB; args.value_size])),
    }
}

fn fill(store: &Store, keys: &[String], value: &Bytes, ttl: Option<Duration>) {
    for key in keys {
        let expiry = ttl.map(Expiry::after).unwrap_or_default();
        store.set(key.clone(), value.clone(), expiry);
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ttlstore=info".parse()?))
        .init();

    let args = Args::parse();
    let value = load_value(&args)?;
    let ttl = (args.ttl_secs > 0).then(|| Duration::from_secs(args.ttl_secs));
    let readers = if args.readers == 0 {
        num_cpus::get()
    } else {
        args.readers
    };

    let config = StoreConfig::default()
        .with_janitor(!args.no_janitor)
        .with_sweep_interval(Duration::from_millis(args.sweep_interval_ms));
    let (store, janitor) = Store::with_config(config)?;

    info!(
        "Filling store with {} entries of {} bytes, ttl: {:?}",
        args.entries,
        value.len(),
        ttl
    );
    let keys: Vec<String> = (0..args.entries).map(key_for).collect();
    let started = Instant::now();
    fill(&store, &keys, &value, ttl);
    println!(
        "average time to set: {:?}",
        per_op(started.elapsed(), args.entries)
    );

    let mut samples: Vec<Duration> = keys
        .iter()
        .map(|key| {
            let started = Instant::now();
            let _ = store.get(key);
            started.elapsed()
        })
        .collect();
    if let Some(stats) = TimeStats::from_samples(&mut samples) {
        println!(
            "Standard deviation in access time: {:?}\nAverage time to access: {:?}\n95th percentile: {:?}\n99th percentile: {:?}\nSlowest access: {:?}",
            stats.std_dev, stats.avg, stats.p95, stats.p99, stats.max
        );
    }

    let started = Instant::now();
    for key in &keys {
        store.delete(key);
    }
    println!(
        "average time to delete: {:?}",
        per_op(started.elapsed(), args.entries)
    );

    // Concurrent readers against a deleting writer
    fill(&store, &keys, &value, ttl);
    info!("Running {} readers against one deleting writer", readers);
    let started = Instant::now();
    crossbeam::scope(|s| {
        for _ in 0..readers {
            s.spawn(|_| {
                for key in &keys {
                    let _ = store.get_value(key);
                }
            });
        }
        for key in &keys {
            store.delete(key);
        }
    })
    .map_err(|_| anyhow!("reader thread panicked"))?;
    println!("concurrent phase took: {:?}", started.elapsed());

    println!("{}", store.metrics().summary());

    if let Some(janitor) = janitor {
        janitor.stop();
    }

    Ok(())
}
