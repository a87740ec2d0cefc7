//! Sharded in-process advisory lock table.
//!
//! Slots are created on first request for a key and pruned when a holder
//! releases with nobody else waiting, so acquiring a lock never depends on any
//! record existing. Distinct keys live in independent slots and never contend beyond
//! the brief shard access needed to find their slot.

use crate::model::LockKey;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slot = Arc<Mutex<()>>;

#[derive(Debug, Default)]
pub struct LockTable {
    slots: DashMap<LockKey, Slot>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive ownership of `key`.
    pub async fn acquire(self: &Arc<Self>, key: LockKey) -> LockGuard {
        let slot = self.slots.entry(key).or_default().clone();
        let guard = slot.lock_owned().await;
        LockGuard {
            table: Arc::clone(self),
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn prune(&self, key: LockKey) {
        // The shard write lock taken by remove_if serializes against
        // `acquire` cloning the slot, so a count of one means nobody else
        // holds or waits on it.
        self.slots
            .remove_if(&key, |_, slot| Arc::strong_count(slot) == 1);
    }
}

/// Exclusive ownership of one key; released on drop.
#[derive(Debug)]
pub struct LockGuard {
    table: Arc<LockTable>,
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl LockGuard {
    pub fn key(&self) -> LockKey {
        self.key
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Release the mutex first so the slot's strong count drops to the
        // table's own reference when nobody is waiting.
        drop(self.guard.take());
        self.table.prune(self.key);
    }
}
