//! Per-record resync lock.
//!
//! A record id is claimed for the duration of one resync attempt. The claim
//! is released when the returned guard drops, on success, failure or panic.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<i64>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<i64>> {
        // the set stays consistent even if a holder panicked
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `id`; `None` if it is already claimed
    pub fn try_claim(&self, id: i64) -> Option<InFlightGuard> {
        if self.lock().insert(id) {
            Some(InFlightGuard {
                ids: Arc::clone(&self.ids),
                id,
            })
        } else {
            None
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lock().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<i64>>>,
    id: i64,
}

impl InFlightGuard {
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.remove(&self.id);
    }
}
