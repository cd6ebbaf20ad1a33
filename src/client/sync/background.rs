//! # Background Resync
//!
//! Optional worker that resends the queue whenever connectivity comes back.
//! Disabled unless `auto_sync` is set; manual resync always works.

use crate::client::sync::SyncCoordinator;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle to the reconnect worker; dropping it stops the worker
#[derive(Debug)]
pub struct AutoSync {
    handle: Option<JoinHandle<()>>,
}

impl AutoSync {
    /// Watch the coordinator's connectivity signal and run
    /// [`SyncCoordinator::resync_all`] on every offline -> online transition
    pub fn spawn(coordinator: Arc<SyncCoordinator>) -> Self {
        let mut network = coordinator.network().subscribe();
        let mut was_online = network.borrow_and_update().online;

        let handle = tokio::spawn(async move {
            while network.changed().await.is_ok() {
                let online = network.borrow_and_update().online;
                if online && !was_online {
                    debug!("connectivity restored; resyncing queue");
                    match coordinator.resync_all().await {
                        Ok(report) if report.is_clean() => {
                            info!(delivered = report.delivered.len(), "auto-sync finished")
                        }
                        Ok(report) => warn!(
                            delivered = report.delivered.len(),
                            failed = report.failed.len(),
                            "auto-sync left submissions queued"
                        ),
                        Err(e) => warn!(error = %e, "auto-sync failed"),
                    }
                }
                was_online = online;
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the background worker
    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        self.abort();
    }
}
