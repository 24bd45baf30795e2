use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Serializes like operations per (candidate, recruiter) pair.
///
/// Entries are dropped once no task holds or waits on the pair.
#[derive(Debug, Default)]
pub struct PairLocks {
    locks: DashMap<(Uuid, Uuid), Arc<Mutex<()>>>,
}

pub struct PairGuard<'a> {
    locks: &'a PairLocks,
    key: (Uuid, Uuid),
    guard: Option<OwnedMutexGuard<()>>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, candidate_id: Uuid, recruiter_id: Uuid) -> PairGuard<'_> {
        let key = (candidate_id, recruiter_id);
        // The shard guard must be released before awaiting.
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let guard = lock.lock_owned().await;
        PairGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for PairGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
