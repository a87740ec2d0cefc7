use crate::model::{CooldownKey, CooldownRecord, LockKey};
use crate::StorageResult;
use async_trait::async_trait;

/// Storage interface for cooldown records.
///
/// Reads on the store itself are unlocked. Anything that must observe a
/// consistent view under mutual exclusion goes through [`CooldownStore::begin`].
#[async_trait]
pub trait CooldownStore: Send + Sync {
    type Transaction: CooldownTransaction;

    /// Point read of one record.
    async fn get_cooldown(&self, key: &CooldownKey) -> StorageResult<Option<CooldownRecord>>;

    /// Insert or overwrite `last_used_at` for the record's key.
    async fn upsert_cooldown(&self, record: CooldownRecord) -> StorageResult<()>;

    /// Delete one record. Returns whether a record existed.
    async fn delete_cooldown(&self, key: &CooldownKey) -> StorageResult<bool>;

    /// All records held for a user, ordered by action name.
    async fn list_cooldowns(&self, user_id: &str) -> StorageResult<Vec<CooldownRecord>>;

    /// Open a transaction.
    async fn begin(&self) -> StorageResult<Self::Transaction>;
}

/// A unit of work against the store.
///
/// Dropping a transaction without calling [`CooldownTransaction::commit`]
/// rolls it back and releases every advisory lock it holds.
#[async_trait]
pub trait CooldownTransaction: Send {
    /// Acquire a transaction-scoped advisory lock, waiting while another
    /// transaction holds the same key. The key does not need a backing record.
    /// Re-acquiring a key already held by this transaction returns immediately.
    async fn advisory_lock(&mut self, key: LockKey) -> StorageResult<()>;

    /// Point read inside the transaction, observing this transaction's own writes.
    async fn get_cooldown(&mut self, key: &CooldownKey) -> StorageResult<Option<CooldownRecord>>;

    /// Insert or overwrite within the transaction.
    async fn upsert_cooldown(&mut self, record: CooldownRecord) -> StorageResult<()>;

    /// Make writes durable and release all advisory locks.
    async fn commit(self) -> StorageResult<()>;

    /// Discard writes and release all advisory locks.
    async fn rollback(self) -> StorageResult<()>;
}
