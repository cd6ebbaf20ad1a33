//! # Offline Submission Client
//!
//! The offline-first core of the contact form: a durable local queue, a
//! connectivity signal, the HTTP gateway and the coordinator tying them
//! together.
//!
//! ## Key Components
//!
//! - `local_db`: SQLite-backed [`QueueStore`] with an observable pending set
//! - `network_monitor`: [`ConnectivityObserver`] fed by environment events
//! - `gateway`: [`SubmissionGateway`] trait and the reqwest [`HttpGateway`]
//! - `sync`: [`SyncCoordinator`] routing and resync, plus [`AutoSync`]
//! - `config`: environment-aware [`Config`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use offline_forms::client::{Config, OfflineClient};
//! use offline_forms::shared::{Category, SubmissionFields};
//!
//! # async fn example() -> Result<(), offline_forms::client::OfflineError> {
//! let client = OfflineClient::start(&Config::new(), true).await?;
//!
//! let fields = SubmissionFields::new("Ana", "García", "ana@example.com", Category::Support);
//! client.coordinator().submit(fields).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod local_db;
pub mod network_monitor;
pub mod sync;

pub use config::Config;
pub use error::{GatewayError, OfflineError};
pub use gateway::{HttpGateway, SubmissionGateway};
pub use local_db::{QueueStats, QueueStore};
pub use network_monitor::{
    ConnectivityEvent, ConnectivityObserver, ConnectivityState, ListenerGuard, NetworkStatus,
};
pub use sync::{AutoSync, SubmissionStatus, SubmitOutcome, SyncCoordinator, SyncReport};

use std::sync::Arc;
use tracing::info;

/// Fully wired client: opened store, HTTP gateway, connectivity observer and
/// coordinator, with the reconnect worker running when `auto_sync` is set.
#[derive(Debug)]
pub struct OfflineClient {
    coordinator: Arc<SyncCoordinator>,
    auto_sync: Option<AutoSync>,
}

impl OfflineClient {
    /// Wire everything from `config`; `initially_online` is the environment's
    /// reachability flag at startup.
    pub async fn start(config: &Config, initially_online: bool) -> Result<Self, OfflineError> {
        let store = Arc::new(QueueStore::from_config(config));
        store.open().await?;

        let gateway = Arc::new(HttpGateway::from_config(config)?);
        Ok(Self::with_parts(
            store,
            gateway,
            ConnectivityObserver::new(initially_online),
            config.auto_sync(),
        ))
    }

    /// Wire pre-built collaborators
    pub fn with_parts(
        store: Arc<QueueStore>,
        gateway: Arc<dyn SubmissionGateway>,
        network: ConnectivityObserver,
        auto_sync: bool,
    ) -> Self {
        let coordinator = Arc::new(SyncCoordinator::new(store, gateway, network));
        let auto_sync = auto_sync.then(|| AutoSync::spawn(Arc::clone(&coordinator)));
        info!(auto_sync = auto_sync.is_some(), "offline client started");
        Self {
            coordinator,
            auto_sync,
        }
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        self.coordinator.store()
    }

    pub fn network(&self) -> &ConnectivityObserver {
        self.coordinator.network()
    }

    pub fn auto_sync_enabled(&self) -> bool {
        self.auto_sync.is_some()
    }

    /// Stop background work and close the store
    pub async fn shutdown(mut self) {
        if let Some(auto_sync) = self.auto_sync.take() {
            auto_sync.stop();
        }
        self.coordinator.store().close().await;
    }
}
