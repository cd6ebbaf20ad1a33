//! Property-based tests for the queue store
//!
//! Random sequences of save / mark-synced / delete must keep the observable
//! pending set equal to the unsynced rows on disk.

use crate::common::sample_fields;
use offline_forms::client::{OfflineError, QueueStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Save(String),
    /// Index into the ids saved so far, or an unknown id when out of range
    MarkSynced(usize),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[A-Z][a-z]{1,8}".prop_map(Op::Save),
        2 => (0usize..12).prop_map(Op::MarkSynced),
        2 => (0usize..12).prop_map(Op::Delete),
    ]
}

fn pick(saved: &[i64], index: usize) -> i64 {
    saved.get(index).copied().unwrap_or(10_000 + index as i64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_pending_count_tracks_unsynced_rows(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let store = QueueStore::in_memory();
            let mut saved: Vec<i64> = Vec::new();

            for op in ops {
                match op {
                    Op::Save(name) => {
                        saved.push(store.save(&sample_fields(&name)).await.unwrap());
                    }
                    Op::MarkSynced(index) => {
                        let id = pick(&saved, index);
                        match store.mark_synced(id).await {
                            Ok(()) | Err(OfflineError::NotFound { .. }) => {}
                            Err(e) => panic!("mark_synced({}) failed: {:?}", id, e),
                        }
                        let pending = store.list_pending().await.unwrap();
                        prop_assert!(pending.iter().all(|r| r.id != Some(id)));
                    }
                    Op::Delete(index) => {
                        store.delete(pick(&saved, index)).await.unwrap();
                    }
                }

                let all = store.list_all().await.unwrap();
                prop_assert!(all.iter().all(|r| !r.synced));
                prop_assert_eq!(store.pending_count(), all.len());
                prop_assert_eq!(store.pending_forms(), store.list_pending().await.unwrap());
            }
            Ok(())
        })?;
    }

    #[test]
    fn test_saved_ids_strictly_increase(count in 1usize..16, delete_every in 1usize..4) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let store = QueueStore::in_memory();
            let mut last = 0;
            for i in 0..count {
                let id = store.save(&sample_fields("Ana")).await.unwrap();
                prop_assert!(id > last);
                last = id;
                if i % delete_every == 0 {
                    store.delete(id).await.unwrap();
                }
            }
            Ok(())
        })?;
    }
}
