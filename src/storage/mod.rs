//! Storage Engine
//!
//! In-memory key-value store with per-entry expiry and a background janitor.

mod config;
mod entry;
mod janitor;
mod store;
mod task_janitor;
mod value;

pub use config::{StoreConfig, DEFAULT_SWEEP_INTERVAL};
pub use entry::{Entry, Expiry};
pub use janitor::{Janitor, JanitorHandle};
pub use store::Store;
pub use task_janitor::TaskJanitorHandle;
pub use value::ByteValue;
