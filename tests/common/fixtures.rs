//! Submission and store fixtures

use offline_forms::client::{ConnectivityObserver, QueueStore, SubmissionGateway, SyncCoordinator};
use offline_forms::shared::{Category, SubmissionFields};
use std::sync::Arc;

/// Valid form payload for `name`
pub fn sample_fields(name: &str) -> SubmissionFields {
    SubmissionFields::new(
        name,
        "Pérez",
        format!("{}@example.com", name.to_lowercase()),
        Category::General,
    )
    .with_notes("sent from the test suite")
}

/// Opened in-memory queue
pub async fn memory_store() -> Arc<QueueStore> {
    let store = Arc::new(QueueStore::in_memory());
    store.open().await.expect("in-memory store opens");
    store
}

/// Coordinator over a fresh in-memory store
pub async fn coordinator_with(
    gateway: Arc<dyn SubmissionGateway>,
    online: bool,
) -> SyncCoordinator {
    SyncCoordinator::new(memory_store().await, gateway, ConnectivityObserver::new(online))
}
