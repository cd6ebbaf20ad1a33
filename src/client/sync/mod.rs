//! # Sync Coordinator
//!
//! Routes new submissions and drives the resync of queued ones.
//!
//! ## Routing
//!
//! - **Offline**: the submission is saved to the [`QueueStore`] and the gateway
//!   is never called
//! - **Online**: the submission is posted once; a gateway failure is reported
//!   as `Failed` and the submission is *not* queued
//!
//! ## Resync
//!
//! A queued record is resent on request. Resync requires connectivity, runs at
//! most once per record at a time, and removes the record from the queue only
//! after the gateway confirms delivery.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use offline_forms::client::{ConnectivityObserver, HttpGateway, QueueStore, SyncCoordinator};
//! use offline_forms::shared::{Category, SubmissionFields};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), offline_forms::client::OfflineError> {
//! let coordinator = SyncCoordinator::new(
//!     Arc::new(QueueStore::in_memory()),
//!     Arc::new(HttpGateway::new("https://jsonplaceholder.typicode.com/posts")),
//!     ConnectivityObserver::new(false),
//! );
//!
//! let fields = SubmissionFields::new("Ana", "García", "ana@example.com", Category::General);
//! coordinator.submit(fields).await?; // queued: we are offline
//!
//! coordinator.network().set_online(true);
//! let report = coordinator.resync_all().await?;
//! println!("delivered {:?}", report.delivered);
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod in_flight;
pub mod sync_state;

pub use background::AutoSync;
pub use in_flight::InFlight;
pub use sync_state::{
    Notice, Severity, SubmissionPhase, SubmissionStatus, SubmitOutcome, SyncReport,
};

use crate::client::error::OfflineError;
use crate::client::gateway::SubmissionGateway;
use crate::client::local_db::QueueStore;
use crate::client::network_monitor::ConnectivityObserver;
use crate::shared::{ServerAck, SubmissionFields};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Coordinates the queue store, the gateway and the connectivity signal
pub struct SyncCoordinator {
    store: Arc<QueueStore>,
    gateway: Arc<dyn SubmissionGateway>,
    network: ConnectivityObserver,
    in_flight: InFlight,
    status: watch::Sender<SubmissionStatus>,
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("store", &self.store)
            .field("network", &self.network)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<QueueStore>,
        gateway: Arc<dyn SubmissionGateway>,
        network: ConnectivityObserver,
    ) -> Self {
        let (status, _) = watch::channel(SubmissionStatus::default());
        Self {
            store,
            gateway,
            network,
            in_flight: InFlight::new(),
            status,
        }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    pub fn network(&self) -> &ConnectivityObserver {
        &self.network
    }

    /// Current status of the latest attempt
    pub fn status(&self) -> SubmissionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    /// Clear the status once the UI has shown it
    pub fn reset_status(&self) {
        self.status.send_replace(SubmissionStatus::default());
    }

    /// Whether a resync of `id` is in flight
    pub fn is_syncing(&self, id: i64) -> bool {
        self.in_flight.contains(id)
    }

    /// Route a new submission: queue it when offline, post it when online
    pub async fn submit(&self, fields: SubmissionFields) -> Result<SubmitOutcome, OfflineError> {
        self.begin(SubmissionPhase::Submitting);

        let result = match fields.validate() {
            Err(e) => Err(OfflineError::from(e)),
            Ok(()) if !self.network.is_online() => {
                info!("offline: saving submission locally");
                self.store
                    .save(&fields)
                    .await
                    .map(|id| SubmitOutcome::QueuedLocally { id })
            }
            Ok(()) => {
                info!("online: posting submission");
                self.gateway
                    .submit(&fields)
                    .await
                    .map(SubmitOutcome::Delivered)
                    .map_err(OfflineError::from)
            }
        };

        match &result {
            Ok(SubmitOutcome::Delivered(ack)) => {
                info!(server_id = ack.id, "submission delivered");
                self.finish(
                    SubmissionPhase::Delivered,
                    Some(ack.clone()),
                    Notice::Delivered { server_id: ack.id },
                );
            }
            Ok(SubmitOutcome::QueuedLocally { id }) => {
                self.finish(
                    SubmissionPhase::QueuedLocally,
                    None,
                    Notice::SavedLocally { id: *id },
                );
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.finish(SubmissionPhase::Failed, None, Notice::from_error(e));
            }
        }

        result
    }

    /// Resend queued record `id`; on confirmed delivery it is purged from
    /// the queue.
    pub async fn resync(&self, id: i64) -> Result<ServerAck, OfflineError> {
        if !self.network.is_online() {
            warn!(id, "resync rejected: offline");
            return Err(OfflineError::NoConnection);
        }

        let Some(_claim) = self.in_flight.try_claim(id) else {
            warn!(id, "resync rejected: already in flight");
            return Err(OfflineError::SyncInProgress { id });
        };

        self.begin(SubmissionPhase::Syncing);
        info!(id, "resyncing queued submission");

        let result = self.deliver_queued(id).await;

        match &result {
            Ok(ack) => {
                info!(id, server_id = ack.id, "queued submission delivered");
                self.finish(
                    SubmissionPhase::Delivered,
                    Some(ack.clone()),
                    Notice::Delivered { server_id: ack.id },
                );
            }
            Err(e) => {
                warn!(id, error = %e, "resync failed; submission stays queued");
                self.finish(SubmissionPhase::QueuedLocally, None, Notice::from_error(e));
            }
        }

        result
    }

    async fn deliver_queued(&self, id: i64) -> Result<ServerAck, OfflineError> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(OfflineError::NotFound { id })?;

        let ack = self.gateway.submit(&record.fields).await?;

        if let Err(e) = self.store.mark_synced(id).await {
            // delivered remotely but still queued locally
            error!(id, server_id = ack.id, error = %e, "failed to mark submission synced");
            return Err(e);
        }

        Ok(ack)
    }

    /// Resync every queued record, oldest first
    pub async fn resync_all(&self) -> Result<SyncReport, OfflineError> {
        if !self.network.is_online() {
            return Err(OfflineError::NoConnection);
        }

        let mut pending = self.store.list_pending().await?;
        pending.reverse();

        let mut report = SyncReport::default();
        for id in pending.into_iter().filter_map(|record| record.id) {
            match self.resync(id).await {
                Ok(_) => report.delivered.push(id),
                Err(OfflineError::SyncInProgress { .. }) | Err(OfflineError::NotFound { .. }) => {
                    report.skipped.push(id)
                }
                Err(OfflineError::NoConnection) => {
                    report.failed.push((id, OfflineError::NoConnection));
                    break;
                }
                Err(e) => report.failed.push((id, e)),
            }
        }

        info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "queue resync finished"
        );
        Ok(report)
    }

    /// Remove a queued record at the user's request
    pub async fn delete(&self, id: i64) -> Result<bool, OfflineError> {
        self.store.delete(id).await
    }

    fn begin(&self, phase: SubmissionPhase) {
        self.status.send_modify(|status| {
            status.phase = phase;
            status.is_loading = true;
            status.notice = None;
        });
    }

    fn finish(&self, phase: SubmissionPhase, delivered: Option<ServerAck>, notice: Notice) {
        self.status.send_modify(|status| {
            status.phase = phase;
            status.is_loading = false;
            status.delivered = delivered;
            status.notice = Some(notice);
        });
    }
}
