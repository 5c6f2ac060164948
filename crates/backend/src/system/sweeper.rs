use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{error, info};

use crate::domain::bookings;
use crate::shared::config::SweeperConfig;

/// Background sweep that auto-completes overdue bookings.
///
/// Owned by the composition root: construct once, `spawn` consumes the
/// sweeper so it cannot be started twice, and the returned handle stops it.
pub struct BookingSweeper {
    db: DatabaseConnection,
    interval: Duration,
    recovery: Duration,
}

pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl BookingSweeper {
    pub fn new(db: DatabaseConnection, config: &SweeperConfig) -> Self {
        Self {
            db,
            interval: Duration::from_secs(config.interval_seconds),
            recovery: Duration::from_secs(config.recovery_seconds),
        }
    }

    pub fn spawn(self) -> SweeperHandle {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(self.run_loop(receiver));
        SweeperHandle { shutdown, task }
    }

    async fn run_loop(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Booking sweeper started, interval {}s",
            self.interval.as_secs()
        );
        loop {
            // A failed pass retries sooner than the regular cadence.
            let wait = match bookings::service::sweep_once(&self.db).await {
                Ok(_) => self.interval,
                Err(e) => {
                    error!("Booking sweep failed: {e}");
                    self.recovery
                }
            };

            tokio::select! {
                _ = time::sleep(wait) => {}
                _ = shutdown.changed() => {
                    info!("Booking sweeper shutting down");
                    return;
                }
            }
        }
    }
}

impl SweeperHandle {
    /// Signal shutdown and wait for the in-flight pass to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
