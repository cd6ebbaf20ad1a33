//! Queue store behaviour through the public API

use crate::common::{memory_store, sample_fields};
use crate::{assert_err, assert_ok, assert_pending_consistent};
use offline_forms::client::{OfflineError, QueueStore};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_saved_records_are_pending_newest_first() {
    let store = memory_store().await;

    let first = assert_ok!(store.save(&sample_fields("Ana")).await);
    let second = assert_ok!(store.save(&sample_fields("Luis")).await);

    let pending = assert_ok!(store.list_pending().await);
    let ids: Vec<i64> = pending.iter().filter_map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(pending[1].fields, sample_fields("Ana"));
    assert!(pending.iter().all(|r| !r.synced));
    assert_pending_consistent!(store);
}

#[tokio::test]
async fn test_mark_synced_purges_record() {
    let store = memory_store().await;
    let id = assert_ok!(store.save(&sample_fields("Ana")).await);
    let other = assert_ok!(store.save(&sample_fields("Luis")).await);

    assert_ok!(store.mark_synced(id).await);

    let ids: Vec<i64> = assert_ok!(store.list_all().await)
        .iter()
        .filter_map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![other]);
    assert!(assert_ok!(store.get(id).await).is_none());
    assert_pending_consistent!(store);
}

#[tokio::test]
async fn test_mark_synced_unknown_id_is_not_found() {
    let store = memory_store().await;
    assert_ok!(store.save(&sample_fields("Ana")).await);

    assert_err!(store.mark_synced(4242).await, OfflineError::NotFound { id: 4242 });
    assert_eq!(store.pending_count(), 1);
}

#[tokio::test]
async fn test_delete_twice_matches_delete_once() {
    let store = memory_store().await;
    let id = assert_ok!(store.save(&sample_fields("Ana")).await);
    let kept = assert_ok!(store.save(&sample_fields("Luis")).await);

    assert!(assert_ok!(store.delete(id).await));
    let after_once = assert_ok!(store.list_all().await);

    assert!(!assert_ok!(store.delete(id).await));
    let after_twice = assert_ok!(store.list_all().await);

    assert_eq!(after_once, after_twice);
    assert_eq!(after_twice.len(), 1);
    assert_eq!(after_twice[0].id, Some(kept));
}

#[tokio::test]
async fn test_subscriber_sees_every_mutation() {
    let store = memory_store().await;
    let mut rx = store.subscribe();

    let id = assert_ok!(store.save(&sample_fields("Ana")).await);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 1);

    assert_ok!(store.mark_synced(id).await);
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_empty());

    let id = assert_ok!(store.save(&sample_fields("Luis")).await);
    rx.borrow_and_update();
    assert_ok!(store.delete(id).await);
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow().is_empty());
}

#[tokio::test]
async fn test_stats_count_pending() {
    let store = memory_store().await;
    for name in ["Ana", "Luis", "Marta"] {
        assert_ok!(store.save(&sample_fields(name)).await);
    }

    let stats = assert_ok!(store.stats().await);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mutations_apply_in_issue_order_under_concurrent_reads() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(QueueStore::new(dir.path().join("forms.db")));
    assert_ok!(store.open().await);

    let stop = Arc::new(AtomicBool::new(false));
    let scans = Arc::new(AtomicUsize::new(0));
    let reader = {
        let store = Arc::clone(&store);
        let stop = Arc::clone(&stop);
        let scans = Arc::clone(&scans);
        tokio::spawn(async move {
            while !stop.load(Ordering::Acquire) {
                let all = store.list_all().await.expect("reader scan failed");
                assert!(
                    all.iter().all(|record| !record.synced),
                    "reader observed a synced row: {:?}",
                    all
                );
                scans.fetch_add(1, Ordering::Relaxed);
                tokio::task::yield_now().await;
            }
        })
    };

    for round in 0..30 {
        let id = assert_ok!(store.save(&sample_fields("Ana")).await);

        // mark_synced is issued first, so the delete finds the row already purged
        let (marked, removed) = tokio::join!(store.mark_synced(id), store.delete(id));

        assert_ok!(marked, format!("mark_synced failed in round {}", round));
        let removed = assert_ok!(removed, format!("delete failed in round {}", round));
        assert!(!removed, "delete overtook mark_synced in round {}", round);
        assert_eq!(store.pending_count(), 0);
    }

    while scans.load(Ordering::Relaxed) == 0 {
        tokio::task::yield_now().await;
    }
    stop.store(true, Ordering::Release);
    reader.await.unwrap();
    assert_pending_consistent!(store);
}
