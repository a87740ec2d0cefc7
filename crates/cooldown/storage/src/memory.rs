//! In-memory cooldown store.
//!
//! Advisory locks come from a shared [`LockTable`], so every gate built on
//! clones of one store excludes each other. Transactions stage their writes
//! and apply them atomically on commit. This adapter only coordinates callers
//! inside one process; use the Postgres adapter when several processes share
//! cooldown state.

use crate::lock_table::{LockGuard, LockTable};
use crate::model::{CooldownKey, CooldownRecord, LockKey};
use crate::traits::{CooldownStore, CooldownTransaction};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Records = RwLock<HashMap<CooldownKey, DateTime<Utc>>>;

/// In-memory cooldown store. Cloning shares state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCooldownStore {
    records: Arc<Records>,
    locks: Arc<LockTable>,
}

impl InMemoryCooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(read(&self.records)?.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// The advisory lock table shared by this store's transactions.
    pub fn lock_table(&self) -> &Arc<LockTable> {
        &self.locks
    }
}

fn read(
    records: &Records,
) -> StorageResult<std::sync::RwLockReadGuard<'_, HashMap<CooldownKey, DateTime<Utc>>>> {
    records
        .read()
        .map_err(|_| StorageError::LockPoisoned("cooldown records"))
}

fn write(
    records: &Records,
) -> StorageResult<std::sync::RwLockWriteGuard<'_, HashMap<CooldownKey, DateTime<Utc>>>> {
    records
        .write()
        .map_err(|_| StorageError::LockPoisoned("cooldown records"))
}

#[async_trait]
impl CooldownStore for InMemoryCooldownStore {
    type Transaction = InMemoryTransaction;

    async fn get_cooldown(&self, key: &CooldownKey) -> StorageResult<Option<CooldownRecord>> {
        let guard = read(&self.records)?;
        Ok(guard
            .get(key)
            .map(|at| CooldownRecord::new(key.clone(), *at)))
    }

    async fn upsert_cooldown(&self, record: CooldownRecord) -> StorageResult<()> {
        let mut guard = write(&self.records)?;
        guard.insert(record.key, record.last_used_at);
        Ok(())
    }

    async fn delete_cooldown(&self, key: &CooldownKey) -> StorageResult<bool> {
        let mut guard = write(&self.records)?;
        Ok(guard.remove(key).is_some())
    }

    async fn list_cooldowns(&self, user_id: &str) -> StorageResult<Vec<CooldownRecord>> {
        let guard = read(&self.records)?;
        let mut records: Vec<CooldownRecord> = guard
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(key, at)| CooldownRecord::new(key.clone(), *at))
            .collect();
        records.sort_by(|a, b| a.key.action.cmp(&b.key.action));
        Ok(records)
    }

    async fn begin(&self) -> StorageResult<Self::Transaction> {
        Ok(InMemoryTransaction {
            records: Arc::clone(&self.records),
            locks: Arc::clone(&self.locks),
            held: Vec::new(),
            staged: HashMap::new(),
        })
    }
}

/// Transaction over [`InMemoryCooldownStore`].
///
/// Lock guards are released when the transaction is committed, rolled back or
/// dropped; staged writes only become visible on commit.
#[derive(Debug)]
pub struct InMemoryTransaction {
    records: Arc<Records>,
    locks: Arc<LockTable>,
    held: Vec<LockGuard>,
    staged: HashMap<CooldownKey, DateTime<Utc>>,
}

impl InMemoryTransaction {
    /// Keys locked by this transaction.
    pub fn held_locks(&self) -> Vec<LockKey> {
        self.held.iter().map(LockGuard::key).collect()
    }
}

#[async_trait]
impl CooldownTransaction for InMemoryTransaction {
    async fn advisory_lock(&mut self, key: LockKey) -> StorageResult<()> {
        if self.held.iter().any(|guard| guard.key() == key) {
            return Ok(());
        }
        let guard = self.locks.acquire(key).await;
        self.held.push(guard);
        Ok(())
    }

    async fn get_cooldown(&mut self, key: &CooldownKey) -> StorageResult<Option<CooldownRecord>> {
        if let Some(at) = self.staged.get(key) {
            return Ok(Some(CooldownRecord::new(key.clone(), *at)));
        }
        let guard = read(&self.records)?;
        Ok(guard
            .get(key)
            .map(|at| CooldownRecord::new(key.clone(), *at)))
    }

    async fn upsert_cooldown(&mut self, record: CooldownRecord) -> StorageResult<()> {
        self.staged.insert(record.key, record.last_used_at);
        Ok(())
    }

    async fn commit(mut self) -> StorageResult<()> {
        let staged = std::mem::take(&mut self.staged);
        if !staged.is_empty() {
            let mut guard = write(&self.records)?;
            guard.extend(staged);
        }
        // Locks are released when `self` drops here, after the writes landed.
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        Ok(())
    }
}
