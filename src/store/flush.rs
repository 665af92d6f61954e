//! Background flushing of dirty registry state
//!
//! Mutations only flag the registry dirty. This scheduler wakes on a fixed
//! interval, takes a consistent snapshot if anything changed, and writes it
//! on the blocking pool. A failed save re-flags the registry so the next
//! tick retries. On shutdown one final flush is attempted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{HomeStore, StoreError};
use crate::homes::HomeRegistry;

/// Default interval between flush attempts in milliseconds
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 5000;

/// Periodically persists the registry through a [`HomeStore`]
pub struct FlushScheduler {
    registry: Arc<HomeRegistry>,
    store: Arc<dyn HomeStore>,
    interval: Duration,
}

impl std::fmt::Debug for FlushScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushScheduler")
            .field("store", &self.store.describe())
            .field("interval", &self.interval)
            .finish()
    }
}

impl FlushScheduler {
    pub fn new(registry: Arc<HomeRegistry>, store: Arc<dyn HomeStore>, interval: Duration) -> Self {
        Self {
            registry,
            store,
            interval,
        }
    }

    /// Save the registry if it is dirty.
    ///
    /// Returns `Ok(true)` if a snapshot was written, `Ok(false)` if there was
    /// nothing to do.
    pub async fn flush_now(&self) -> Result<bool, StoreError> {
        let Some(snapshot) = self.registry.take_dirty_snapshot() else {
            return Ok(false);
        };

        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(StoreError::from)
            .and_then(|saved| saved);

        match result {
            Ok(()) => {
                debug!("Flushed home registry to {}", self.store.describe());
                Ok(true)
            }
            Err(e) => {
                // Keep the change pending for the next attempt
                self.registry.mark_dirty();
                Err(e)
            }
        }
    }

    /// Flush on every tick until `shutdown` flips, then flush once more
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Flushing homes to {} every {:?}",
            self.store.describe(),
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.flush_now().await {
                        error!("Failed to flush home registry: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        match self.flush_now().await {
            Ok(true) => info!("Final flush of home registry complete"),
            Ok(false) => debug!("Home registry clean at shutdown"),
            Err(e) => error!("Final flush of home registry failed: {}", e),
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime
    pub fn spawn(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
