//! Store Metrics
//!
//! Operation counters and janitor sweep timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector shared by a store and its janitor
#[derive(Debug)]
pub struct StoreMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,

    /// Entries removed by the janitor
    expired: AtomicU64,

    /// Sweep timing
    sweeps: AtomicU64,
    sweep_sum_us: AtomicU64,
    sweep_max_us: AtomicU64,
    last_sweep_us: AtomicU64,
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
            sweep_sum_us: AtomicU64::new(0),
            sweep_max_us: AtomicU64::new(0),
            last_sweep_us: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_read(&self, found: bool) {
        if found {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed janitor sweep
    pub(crate) fn record_sweep(&self, removed: usize, elapsed: Duration) {
        let elapsed_us = elapsed.as_micros() as u64;

        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.expired.fetch_add(removed as u64, Ordering::Relaxed);
        self.sweep_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.last_sweep_us.store(elapsed_us, Ordering::Relaxed);

        // Update max (atomic max)
        let mut current_max = self.sweep_max_us.load(Ordering::Relaxed);
        while elapsed_us > current_max {
            match self.sweep_max_us.compare_exchange_weak(
                current_max,
                elapsed_us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(c) => current_max = c,
            }
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    /// Deletes that removed an entry
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Get hit ratio in [0, 1]
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }

    /// Get average sweep duration in microseconds
    pub fn avg_sweep_us(&self) -> f64 {
        let count = self.sweeps();
        if count == 0 {
            return 0.0;
        }
        let sum = self.sweep_sum_us.load(Ordering::Relaxed);
        sum as f64 / count as f64
    }

    pub fn max_sweep_us(&self) -> u64 {
        self.sweep_max_us.load(Ordering::Relaxed)
    }

    pub fn last_sweep(&self) -> Duration {
        Duration::from_micros(self.last_sweep_us.load(Ordering::Relaxed))
    }

    /// Get a summary of metrics
    pub fn summary(&self) -> String {
        format!(
            "Reads: {} hits / {} misses | Sets: {} | Deletes: {} | Expired: {} in {} sweeps (µs): avg={:.1}, max={}",
            self.hits(),
            self.misses(),
            self.sets(),
            self.deletes(),
            self.expired(),
            self.sweeps(),
            self.avg_sweep_us(),
            self.max_sweep_us()
        )
    }
}
