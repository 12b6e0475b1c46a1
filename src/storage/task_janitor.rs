//! Task Janitor
//!
//! Runs the janitor sweep on a Tokio interval for stores embedded in an
//! async application.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::janitor::Attached;
use super::{Janitor, Store};
use crate::error::{Error, Result};

impl Janitor {
    /// Spawn the janitor as a task on the current Tokio runtime.
    ///
    /// Fails with [`Error::JanitorRunning`] if the store already has a
    /// janitor thread or task.
    pub fn spawn_task(store: &Store, interval: Duration) -> Result<TaskJanitorHandle> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let attached = Attached::claim(store, interval)?;

        let janitor = Self::new(store, interval);
        let token = CancellationToken::new();
        let task = runtime.spawn(run(janitor, token.clone(), attached));

        Ok(TaskJanitorHandle { token, task })
    }
}

async fn run(janitor: Janitor, token: CancellationToken, _attached: Attached) {
    let mut ticker = interval(janitor.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the immediate first tick
    ticker.tick().await;
    info!("Janitor task started, interval: {:?}", janitor.interval());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if janitor.sweep().is_none() {
                    debug!("Store dropped, janitor task exiting");
                    break;
                }
            }
            _ = token.cancelled() => break,
        }
    }

    info!("Janitor task stopped");
}

/// Controls a janitor task.
///
/// Dropping the handle detaches the task; it keeps sweeping until the last
/// [`Store`] handle is dropped or the runtime shuts down.
#[derive(Debug)]
pub struct TaskJanitorHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl TaskJanitorHandle {
    /// Ask the task to stop after its current sweep
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the task and wait for it to exit
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Janitor task failed");
        }
    }
}
