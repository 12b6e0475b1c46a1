//! TTLSTORE - Embeddable In-Memory Expiring Cache
//!
//! A thread-safe key-value table guarded by a single reader/writer lock,
//! with a cancellable background janitor that removes expired entries.

pub mod error;
pub mod metrics;
pub mod storage;

pub use error::{Error, Result};
pub use metrics::StoreMetrics;
pub use storage::{
    ByteValue, Entry, Expiry, Janitor, JanitorHandle, Store, StoreConfig, TaskJanitorHandle,
};
