//! PostgreSQL adapter for cooldown storage.
//!
//! Mutual exclusion uses `pg_advisory_xact_lock`, which locks an arbitrary
//! `BIGINT` rather than a row. Two first-time callers therefore serialize on
//! the same key even before any `user_cooldowns` row exists, and the lock is
//! released by Postgres itself when the transaction ends.

use crate::model::{CooldownKey, CooldownRecord, LockKey};
use crate::traits::{CooldownStore, CooldownTransaction};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info};

const SQL_ADVISORY_LOCK: &str = "SELECT pg_advisory_xact_lock($1)";

const SQL_SELECT_LAST_USED: &str = r#"
    SELECT user_id, action_name, last_used_at
      FROM user_cooldowns
     WHERE user_id = $1 AND action_name = $2
"#;

const SQL_SELECT_FOR_USER: &str = r#"
    SELECT user_id, action_name, last_used_at
      FROM user_cooldowns
     WHERE user_id = $1
     ORDER BY action_name
"#;

const SQL_UPSERT: &str = r#"
    INSERT INTO user_cooldowns (user_id, action_name, last_used_at)
    VALUES ($1, $2, $3)
    ON CONFLICT (user_id, action_name) DO UPDATE
    SET last_used_at = EXCLUDED.last_used_at
"#;

const SQL_DELETE: &str = "DELETE FROM user_cooldowns WHERE user_id = $1 AND action_name = $2";

/// PostgreSQL-backed cooldown store.
#[derive(Clone, Debug)]
pub struct PostgresCooldownStore {
    pool: PgPool,
}

impl PostgresCooldownStore {
    /// Connect to PostgreSQL and initialize the schema.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to connect postgres: {e}")))?;
        info!(max_connections, "Connected to PostgreSQL cooldown store");
        Self::from_pool(pool).await
    }

    /// Create the adapter from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn init_schema(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_cooldowns (
                user_id TEXT NOT NULL,
                action_name TEXT NOT NULL,
                last_used_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (user_id, action_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;
        debug!("user_cooldowns schema ready");
        Ok(())
    }
}

#[async_trait]
impl CooldownStore for PostgresCooldownStore {
    type Transaction = PostgresTransaction;

    async fn get_cooldown(&self, key: &CooldownKey) -> StorageResult<Option<CooldownRecord>> {
        let row = sqlx::query(SQL_SELECT_LAST_USED)
            .bind(&key.user_id)
            .bind(&key.action)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_record).transpose()
    }

    async fn upsert_cooldown(&self, record: CooldownRecord) -> StorageResult<()> {
        sqlx::query(SQL_UPSERT)
            .bind(&record.key.user_id)
            .bind(&record.key.action)
            .bind(record.last_used_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_cooldown(&self, key: &CooldownKey) -> StorageResult<bool> {
        let result = sqlx::query(SQL_DELETE)
            .bind(&key.user_id)
            .bind(&key.action)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_cooldowns(&self, user_id: &str) -> StorageResult<Vec<CooldownRecord>> {
        let rows = sqlx::query(SQL_SELECT_FOR_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_record).collect()
    }

    async fn begin(&self) -> StorageResult<Self::Transaction> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTransaction { tx })
    }
}

/// Transaction over [`PostgresCooldownStore`].
///
/// Dropping it without commit lets sqlx issue the rollback when the connection
/// returns to the pool, which also releases any advisory locks taken.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CooldownTransaction for PostgresTransaction {
    async fn advisory_lock(&mut self, key: LockKey) -> StorageResult<()> {
        sqlx::query(SQL_ADVISORY_LOCK)
            .bind(key.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn get_cooldown(&mut self, key: &CooldownKey) -> StorageResult<Option<CooldownRecord>> {
        let row = sqlx::query(SQL_SELECT_LAST_USED)
            .bind(&key.user_id)
            .bind(&key.action)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_record).transpose()
    }

    async fn upsert_cooldown(&mut self, record: CooldownRecord) -> StorageResult<()> {
        sqlx::query(SQL_UPSERT)
            .bind(&record.key.user_id)
            .bind(&record.key.action)
            .bind(record.last_used_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> StorageResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

fn row_to_record(row: PgRow) -> StorageResult<CooldownRecord> {
    let user_id: String = row.try_get("user_id")?;
    let action: String = row.try_get("action_name")?;
    let last_used_at: DateTime<Utc> = row.try_get("last_used_at")?;
    Ok(CooldownRecord::new(
        CooldownKey::new(user_id, action),
        last_used_at,
    ))
}
