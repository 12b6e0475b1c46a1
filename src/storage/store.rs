//! In-Memory Key-Value Store
//!
//! Thread-safe hashmap with expiry metadata, guarded by a single
//! reader/writer lock.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use super::{ByteValue, Entry, Expiry, Janitor, JanitorHandle, StoreConfig};
use crate::error::{Error, Result};
use crate::metrics::StoreMetrics;

#[derive(Debug, Default)]
struct Shared {
    map: RwLock<HashMap<String, Entry>>,
    metrics: StoreMetrics,
    janitor_attached: AtomicBool,
}

/// Thread-safe in-memory key-value store with per-entry expiry.
///
/// Reads take the lock in shared mode and may run concurrently; writes take
/// it exclusively. Cloning a `Store` yields another handle to the same table.
///
/// The store never enforces expiry on reads. Expired entries are removed by
/// a [`Janitor`] when one is running, or by [`Store::sweep_expired`].
///
/// # Example
///
/// ```rust,no_run
/// use ttlstore::{Expiry, Store};
///
/// fn main() -> ttlstore::Result<()> {
///     let (store, janitor) = Store::open(true)?;
///     store.set("a", vec![1u8, 2, 3], Expiry::Never);
///     assert_eq!(store.get("a").map(|e| e.bytes().to_vec()), Some(vec![1, 2, 3]));
///
///     if let Some(janitor) = janitor {
///         janitor.stop();
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<Shared>,
}

/// Non-owning handle that does not keep the table alive
#[derive(Debug, Clone)]
pub(crate) struct WeakStore {
    inner: Weak<Shared>,
}

impl WeakStore {
    pub(crate) fn upgrade(&self) -> Option<Store> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl Store {
    /// Create a new empty store without a janitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store, starting a janitor with a one-second cadence if
    /// `enable_janitor` is set
    pub fn open(enable_janitor: bool) -> Result<(Self, Option<JanitorHandle>)> {
        Self::with_config(StoreConfig::default().with_janitor(enable_janitor))
    }

    /// Create a store from configuration.
    ///
    /// The returned handle, if any, controls the janitor thread. Dropping it
    /// detaches the janitor, which then runs until the last store handle is
    /// dropped.
    pub fn with_config(config: StoreConfig) -> Result<(Self, Option<JanitorHandle>)> {
        let store = Self::new();
        if !config.enable_janitor {
            return Ok((store, None));
        }
        if config.sweep_interval.is_zero() {
            return Err(Error::InvalidInterval);
        }

        let janitor = Janitor::spawn(&store, config.sweep_interval)?;
        Ok((store, Some(janitor)))
    }

    /// Get the entry for `key`, expired or not
    pub fn get(&self, key: &str) -> Option<Entry> {
        let entry = self.inner.map.read().get(key).cloned();
        self.inner.metrics.record_read(entry.is_some());
        entry
    }

    /// Get only the stored value for `key`
    pub fn get_value(&self, key: &str) -> Option<Arc<dyn ByteValue>> {
        self.get(key).map(Entry::into_value)
    }

    /// Insert or overwrite `key`
    pub fn set<V>(&self, key: impl Into<String>, value: V, expiry: impl Into<Expiry>)
    where
        V: ByteValue + 'static,
    {
        self.set_shared(key, Arc::new(value), expiry);
    }

    /// Insert or overwrite `key` with an already shared value
    pub fn set_shared(
        &self,
        key: impl Into<String>,
        value: Arc<dyn ByteValue>,
        expiry: impl Into<Expiry>,
    ) {
        // Build outside the lock so readers never see a partial entry
        let key = key.into();
        let entry = Entry::new(value, expiry.into());
        self.inner.map.write().insert(key, entry);
        self.inner.metrics.record_set();
    }

    /// Delete key, returns true if key existed
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.inner.map.write().remove(key).is_some();
        if removed {
            self.inner.metrics.record_delete();
        }
        removed
    }

    /// Check if key is present (expired entries included)
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.map.read().contains_key(key)
    }

    /// Get the number of keys (including expired)
    pub fn len(&self) -> usize {
        self.inner.map.read().len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the current keys
    pub fn keys(&self) -> Vec<String> {
        self.inner.map.read().keys().cloned().collect()
    }

    /// Remove every entry, returns count of removed keys
    pub fn clear(&self) -> usize {
        let mut map = self.inner.map.write();
        let removed = map.len();
        map.clear();
        removed
    }

    /// Remove `key` if its entry is expired at `now`.
    ///
    /// The check and the removal happen under one write lock, so an entry
    /// refreshed by a concurrent `set` is never removed.
    pub fn remove_if_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut map = self.inner.map.write();
        let expired = map.get(key).is_some_and(|entry| entry.is_expired_at(now));
        if expired {
            map.remove(key);
        }
        expired
    }

    /// Remove expired keys, returns count of removed keys.
    ///
    /// Keys are snapshotted under a brief read lock and each one is then
    /// checked under its own write lock, so the worst-case lock hold time
    /// does not grow with the table.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let started = Instant::now();
        let removed = self
            .keys()
            .iter()
            .filter(|key| self.remove_if_expired(key, now))
            .count();
        self.inner.metrics.record_sweep(removed, started.elapsed());
        removed
    }

    /// Operation counters for this store
    pub fn metrics(&self) -> &StoreMetrics {
        &self.inner.metrics
    }

    /// Mark a janitor as attached, false if one already is
    pub(crate) fn claim_janitor(&self) -> bool {
        self.inner
            .janitor_attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release_janitor(&self) {
        self.inner.janitor_attached.store(false, Ordering::Release);
    }

    pub(crate) fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeDelta;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_basic_operations() {
        let store = Store::new();

        // Set and get
        store.set("a", Bytes::from_static(&[1, 2, 3]), Expiry::Never);
        let entry = store.get("a").unwrap();
        assert_eq!(entry.bytes(), &[1, 2, 3]);
        assert_eq!(entry.expiry(), Expiry::Never);

        // Exists
        assert!(store.contains_key("a"));

        // Delete
        assert!(store.delete("a"));
        assert!(!store.contains_key("a"));
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = Store::new();
        assert!(store.get("nope").is_none());
        assert!(store.get_value("nope").is_none());
    }

    #[test]
    fn test_get_value_omits_expiry() {
        let store = Store::new();
        store.set("k", String::from("hello"), Expiry::after(Duration::from_secs(60)));
        let value = store.get_value("k").unwrap();
        assert_eq!(value.as_bytes(), b"hello");
    }

    #[test]
    fn test_empty_value_is_not_absent() {
        let store = Store::new();
        store.set("empty", Vec::<u8>::new(), Expiry::Never);
        let entry = store.get("empty").unwrap();
        assert!(entry.bytes().is_empty());
    }

    #[test]
    fn test_overwrite_replaces_value_and_expiry() {
        let store = Store::new();
        let later = Utc::now() + TimeDelta::seconds(30);

        store.set("k", "old", Expiry::Never);
        store.set("k", "new", later);

        let entry = store.get("k").unwrap();
        assert_eq!(entry.bytes(), b"new");
        assert_eq!(entry.expiry(), Expiry::At(later));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = Store::new();
        store.set("k", "v", Expiry::Never);
        store.set("other", "v", Expiry::Never);

        assert!(store.delete("k"));
        assert!(!store.delete("k"));
        assert!(store.get("k").is_none());
        assert_eq!(store.keys(), vec!["other".to_string()]);
    }

    #[test]
    fn test_get_does_not_enforce_expiry() {
        let store = Store::new();
        store.set("stale", "v", Expiry::from_unix(1));

        let entry = store.get("stale").unwrap();
        assert!(entry.is_expired());
    }

    #[test]
    fn test_sweep_expired() {
        let store = Store::new();
        let now = Utc::now();

        for i in 0..10 {
            store.set(format!("key{}", i), "v", now - TimeDelta::seconds(1));
        }
        store.set("boundary", "v", now);
        store.set("future", "v", now + TimeDelta::seconds(60));
        store.set("forever", "v", Expiry::Never);

        let removed = store.sweep_expired(now);
        assert_eq!(removed, 11);
        assert_eq!(store.len(), 2);
        assert!(store.contains_key("future"));
        assert!(store.contains_key("forever"));

        assert_eq!(store.metrics().sweeps(), 1);
        assert_eq!(store.metrics().expired(), 11);
    }

    #[test]
    fn test_remove_if_expired_respects_refresh() {
        let store = Store::new();
        let now = Utc::now();
        store.set("k", "v", now - TimeDelta::seconds(1));

        // Refreshed between snapshot and check
        let snapshot = store.keys();
        store.set("k", "v2", now + TimeDelta::seconds(60));

        for key in &snapshot {
            assert!(!store.remove_if_expired(key, now));
        }
        assert!(store.contains_key("k"));

        // Missing keys are ignored
        assert!(!store.remove_if_expired("gone", now));
    }

    #[test]
    fn test_open_without_janitor() {
        let (store, janitor) = Store::open(false).unwrap();
        assert!(janitor.is_none());

        store.set("k", "v", Expiry::from_unix(1));
        thread::sleep(Duration::from_millis(50));
        assert!(store.contains_key("k"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = StoreConfig::default().with_sweep_interval(Duration::ZERO);
        assert!(matches!(
            Store::with_config(config),
            Err(Error::InvalidInterval)
        ));
    }

    #[test]
    fn test_clone_shares_data() {
        let store = Store::new();
        let other = store.clone();
        other.set("k", "v", Expiry::Never);
        assert!(store.contains_key("k"));

        assert_eq!(store.clear(), 1);
        assert!(other.is_empty());
    }

    #[test]
    fn test_metrics_track_operations() {
        let store = Store::new();
        store.set("k", "v", Expiry::Never);
        store.get("k");
        store.get("missing");
        store.delete("k");
        store.delete("k");

        let metrics = store.metrics();
        assert_eq!(metrics.sets(), 1);
        assert_eq!(metrics.hits(), 1);
        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.deletes(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let store = Store::new();

        // Writers on disjoint keys
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let s = store.clone();
                thread::spawn(move || {
                    for j in 0..500 {
                        let key = format!("key-{}-{}", i, j);
                        let value = format!("value-{}-{}", i, j);
                        s.set(key.clone(), value, Expiry::Never);
                        if j % 2 == 0 {
                            s.delete(&key);
                        }
                    }
                })
            })
            .collect();

        // Readers on any keys; every hit must be a whole value
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let s = store.clone();
                thread::spawn(move || {
                    for i in 0..8 {
                        for j in 0..500 {
                            let key = format!("key-{}-{}", i, j);
                            if let Some(entry) = s.get(&key) {
                                assert_eq!(entry.bytes(), format!("value-{}-{}", i, j).as_bytes());
                            }
                            if let Some(value) = s.get_value(&key) {
                                assert!(value.as_bytes().starts_with(b"value-"));
                            }
                        }
                    }
                })
            })
            .collect();

        for h in writers.into_iter().chain(readers) {
            h.join().unwrap();
        }

        assert_eq!(store.len(), 8 * 250);
    }

    #[test]
    fn test_weak_handle_does_not_keep_store_alive() {
        let store = Store::new();
        let weak = store.downgrade();
        assert!(weak.upgrade().is_some());

        drop(store);
        assert!(weak.upgrade().is_none());
    }
}
