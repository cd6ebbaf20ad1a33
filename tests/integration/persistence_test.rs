//! Durability of the on-disk queue across restarts

use crate::assert_ok;
use crate::common::sample_fields;
use offline_forms::client::local_db::StoreLocation;
use offline_forms::client::{Config, OfflineClient, QueueStore};
use offline_forms::shared::AppConfig;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[tokio::test]
async fn test_pending_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("forms.db");

    let (first, second) = {
        let store = QueueStore::new(&db_path);
        let first = assert_ok!(store.save(&sample_fields("Ana")).await);
        let second = assert_ok!(store.save(&sample_fields("Luis")).await);
        store.close().await;
        (first, second)
    };

    let reopened = QueueStore::new(&db_path);
    assert_ok!(reopened.open().await);

    let ids: Vec<i64> = assert_ok!(reopened.list_pending().await)
        .iter()
        .filter_map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(reopened.pending_count(), 2);
}

#[tokio::test]
async fn test_ids_are_not_reused_after_restart() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("forms.db");

    let last = {
        let store = QueueStore::new(&db_path);
        assert_ok!(store.save(&sample_fields("Ana")).await);
        let last = assert_ok!(store.save(&sample_fields("Luis")).await);
        assert_ok!(store.mark_synced(last).await);
        store.close().await;
        last
    };

    let reopened = QueueStore::new(&db_path);
    let next = assert_ok!(reopened.save(&sample_fields("Marta")).await);
    assert!(next > last, "id {} reused after {}", next, last);
}

#[tokio::test]
async fn test_client_uses_configured_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("client.db");
    let config = Config::from_app(AppConfig {
        database_path: Some(db_path.clone()),
        ..AppConfig::default()
    })
    .unwrap();

    let client = assert_ok!(OfflineClient::start(&config, false).await);
    assert_eq!(client.store().location(), &StoreLocation::File(db_path.clone()));
    assert!(!client.auto_sync_enabled());

    assert_ok!(client.coordinator().submit(sample_fields("Ana")).await);
    client.shutdown().await;

    assert!(db_path.exists());
    let reopened = QueueStore::new(&db_path);
    assert_eq!(assert_ok!(reopened.list_pending().await).len(), 1);
}
