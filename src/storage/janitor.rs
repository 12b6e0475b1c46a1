//! Janitor
//!
//! Background thread that periodically removes expired entries from a
//! [`Store`]. It holds only a weak reference to the store and exits once the
//! last store handle is dropped or its own handle asks it to stop. At most
//! one janitor runs per store.

use chrono::Utc;
use crossbeam::channel::{bounded, never, tick, Receiver, Sender};
use crossbeam::select;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::store::WeakStore;
use super::Store;
use crate::error::{Error, Result};

/// Expiry sweeper bound to one store
#[derive(Debug, Clone)]
pub struct Janitor {
    store: WeakStore,
    interval: Duration,
}

impl Janitor {
    /// Create a janitor for `store`; nothing runs until it is spawned
    pub fn new(store: &Store, interval: Duration) -> Self {
        Self {
            store: store.downgrade(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one sweep. Returns `None` once the store has been dropped.
    pub fn sweep(&self) -> Option<usize> {
        let store = self.store.upgrade()?;
        let removed = store.sweep_expired(Utc::now());
        if removed > 0 {
            debug!(removed = removed, remaining = store.len(), "Cleaned up expired keys");
        }
        Some(removed)
    }

    /// Spawn a janitor thread for `store`.
    ///
    /// Fails with [`Error::JanitorRunning`] if the store already has a
    /// janitor thread or task.
    pub fn spawn(store: &Store, interval: Duration) -> Result<JanitorHandle> {
        let attached = Attached::claim(store, interval)?;

        let janitor = Self::new(store, interval);
        let (shutdown_tx, shutdown_rx) = bounded(1);
        let thread = thread::Builder::new()
            .name("ttlstore-janitor".to_string())
            .spawn(move || janitor.run(shutdown_rx, attached))?;

        Ok(JanitorHandle {
            shutdown: shutdown_tx,
            thread,
        })
    }

    fn run(self, mut shutdown: Receiver<()>, _attached: Attached) {
        let ticker = tick(self.interval);
        info!("Janitor started, interval: {:?}", self.interval);

        loop {
            let handle_dropped = select! {
                recv(ticker) -> _ => {
                    if self.sweep().is_none() {
                        debug!("Store dropped, janitor exiting");
                        break;
                    }
                    false
                }
                recv(shutdown) -> msg => match msg {
                    Ok(()) => break,
                    Err(_) => true,
                },
            };

            // Detached: keep running until the store goes away
            if handle_dropped {
                debug!("Janitor handle dropped, janitor detached");
                shutdown = never();
            }
        }

        info!("Janitor stopped");
    }
}

/// Marks a store as having a running janitor until dropped
#[derive(Debug)]
pub(super) struct Attached {
    store: WeakStore,
}

impl Attached {
    pub(super) fn claim(store: &Store, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidInterval);
        }
        if !store.claim_janitor() {
            return Err(Error::JanitorRunning);
        }
        Ok(Self {
            store: store.downgrade(),
        })
    }
}

impl Drop for Attached {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.release_janitor();
        }
    }
}

/// Controls a running janitor thread.
///
/// Dropping the handle detaches the janitor; it keeps sweeping until the
/// last [`Store`] handle is dropped. Use [`JanitorHandle::stop`] to end it
/// early.
#[derive(Debug)]
pub struct JanitorHandle {
    shutdown: Sender<()>,
    thread: JoinHandle<()>,
}

impl JanitorHandle {
    /// Ask the janitor to stop after its current sweep
    pub fn cancel(&self) {
        let _ = self.shutdown.try_send(());
    }

    /// Let the janitor run on its own until the store is dropped
    pub fn detach(self) {}

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Stop the janitor and wait for its thread to exit
    pub fn stop(self) {
        self.cancel();
        if self.thread.join().is_err() {
            warn!("Janitor thread panicked");
        }
    }
}
