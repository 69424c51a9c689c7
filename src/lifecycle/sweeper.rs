//! Periodic cleanup of expired in-memory records.
//!
//! Each store gets its own [`Sweeper`] task. The task owns nothing but an
//! `Arc` to the store, ticks on a fixed interval and exits on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::observability::metrics;

/// A store whose expired entries can be dropped.
///
/// `sweep` must only remove entries that are already expired; a live entry
/// is never touched.
pub trait Sweep: Send + Sync {
    /// Remove expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

pub struct Sweeper<S: Sweep + ?Sized + 'static> {
    name: &'static str,
    target: Arc<S>,
    interval: Duration,
}

impl<S: Sweep + ?Sized + 'static> Sweeper<S> {
    pub fn new(name: &'static str, target: Arc<S>, interval: Duration) -> Self {
        Self {
            name,
            target,
            interval,
        }
    }

    /// Spawn the sweep loop onto the current runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            store = self.name,
            interval_secs = self.interval.as_secs_f64(),
            "Sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // the first tick completes immediately; nothing has expired yet
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.target.sweep();
                    if removed > 0 {
                        tracing::debug!(store = self.name, removed, "Swept expired records");
                    }
                    metrics::record_sweep(self.name, removed);
                }
                _ = shutdown.recv() => {
                    tracing::info!(store = self.name, "Sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
