//! Background worker discarding idle sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::SessionRegistry;

/// Periodically evicts sessions idle for longer than the registry TTL.
pub struct SessionSweeper {
    registry: Arc<SessionRegistry>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl SessionSweeper {
    /// Create a sweeper running every `interval`.
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>, interval: Duration) -> Self {
        Self {
            registry,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Notifier that stops the worker.
    #[must_use]
    pub fn shutdown_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Spawn the worker on the current runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        if self.interval.is_zero() {
            info!("Session sweeper is disabled");
            return;
        }

        info!(interval = ?self.interval, "Starting session sweeper");
        loop {
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {
                    let removed = self.registry.evict_idle();
                    debug!(removed, live = self.registry.len(), "Session sweep completed");
                }
                () = self.shutdown.notified() => {
                    info!("Session sweeper shutting down");
                    break;
                }
            }
        }
    }
}
