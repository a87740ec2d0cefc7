use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cooldown_storage::{CooldownKey, CooldownRecord, CooldownStore, CooldownTransaction};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::duration::DurationResolver;
use crate::error::{
    CooldownError, CooldownResult, ERR_ACQUIRE_LOCK, ERR_BEGIN_TRANSACTION, ERR_CHECK_COOLDOWN,
    ERR_COMMIT_TRANSACTION, ERR_GET_COOLDOWN_TX, ERR_GET_LAST_USED, ERR_LIST_COOLDOWNS,
    ERR_RESET_COOLDOWN, ERR_UPDATE_COOLDOWN,
};
use crate::key::lock_key_for;
use crate::status::CooldownStatus;
use crate::traits::ProgressionService;

/// The Cooldown Gate.
///
/// Holds no mutable state of its own; the store is the only shared resource,
/// so any number of gates (in any number of processes, given a shared store)
/// may guard the same actions.
pub struct CooldownGate<S> {
    store: Arc<S>,
    resolver: DurationResolver,
    clock: Arc<dyn Clock>,
}

impl<S: CooldownStore> CooldownGate<S> {
    pub fn new(store: Arc<S>, config: GateConfig) -> Self {
        Self {
            store,
            resolver: DurationResolver::new(config),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_progression(mut self, progression: Arc<dyn ProgressionService>) -> Self {
        self.resolver = self.resolver.with_progression(progression);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &GateConfig {
        self.resolver.config()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn dev_mode(&self) -> bool {
        self.config().dev_mode
    }

    /// Whether `action` is cooling down for `user_id`. Never writes.
    pub async fn check_cooldown(
        &self,
        user_id: &str,
        action: &str,
    ) -> CooldownResult<CooldownStatus> {
        if self.dev_mode() {
            return Ok(CooldownStatus::READY);
        }

        let key = CooldownKey::new(user_id, action);
        let record = self
            .store
            .get_cooldown(&key)
            .await
            .map_err(|e| CooldownError::storage(ERR_CHECK_COOLDOWN, e))?;

        let Some(record) = record else {
            return Ok(CooldownStatus::READY);
        };
        let duration = self.resolver.effective_cooldown(action).await;
        Ok(CooldownStatus::evaluate(
            self.clock.now(),
            Some(record.last_used_at),
            duration,
        ))
    }

    /// Run `work` if `action` is not cooling down for `user_id`, then record
    /// the use.
    ///
    /// At most one of any number of concurrent calls for the same pair runs
    /// its work within a cooldown window. A failing `work` leaves no trace:
    /// its error is returned as-is and `last_used_at` is untouched.
    ///
    /// Dropping the returned future (for example under
    /// `tokio::time::timeout`) rolls back the transaction and releases the lock.
    pub async fn enforce_cooldown<F, Fut, T, E>(
        &self,
        user_id: &str,
        action: &str,
        work: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CooldownError>,
    {
        let status = self.check_cooldown(user_id, action).await?;
        if status.on_cooldown {
            return Err(CooldownError::on_cooldown(action, status.remaining).into());
        }

        if self.dev_mode() {
            return self.enforce_bypass(user_id, action, work).await;
        }

        self.enforce_locked(user_id, action, work).await
    }

    async fn enforce_bypass<F, Fut, T, E>(
        &self,
        user_id: &str,
        action: &str,
        work: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CooldownError>,
    {
        debug!(
            action = %action,
            user_id = %user_id,
            "DEV_MODE: Bypassing cooldown enforcement"
        );
        let value = work().await?;

        let record = CooldownRecord::new(CooldownKey::new(user_id, action), self.clock.now());
        self.store
            .upsert_cooldown(record)
            .await
            .map_err(|e| CooldownError::storage(ERR_UPDATE_COOLDOWN, e))?;
        Ok(value)
    }

    async fn enforce_locked<F, Fut, T, E>(
        &self,
        user_id: &str,
        action: &str,
        work: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CooldownError>,
    {
        let key = CooldownKey::new(user_id, action);

        // Every early return below drops `tx`, which rolls it back and
        // releases the advisory lock.
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| CooldownError::storage(ERR_BEGIN_TRANSACTION, e))?;

        tx.advisory_lock(lock_key_for(&key))
            .await
            .map_err(|e| CooldownError::storage(ERR_ACQUIRE_LOCK, e))?;

        let record = tx
            .get_cooldown(&key)
            .await
            .map_err(|e| CooldownError::storage(ERR_GET_COOLDOWN_TX, e))?;

        if let Some(record) = record {
            let duration = self.resolver.effective_cooldown(action).await;
            let status =
                CooldownStatus::evaluate(self.clock.now(), Some(record.last_used_at), duration);
            if status.on_cooldown {
                debug!(
                    action = %action,
                    user_id = %user_id,
                    remaining = ?status.remaining,
                    "Race condition detected - concurrent request on cooldown"
                );
                return Err(CooldownError::on_cooldown(action, status.remaining).into());
            }
        }

        let value = match work().await {
            Ok(value) => value,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(
                        action = %action,
                        user_id = %user_id,
                        error = %rollback_err,
                        "Rollback after failed work did not complete"
                    );
                }
                return Err(err);
            }
        };

        tx.upsert_cooldown(CooldownRecord::new(key, self.clock.now()))
            .await
            .map_err(|e| CooldownError::storage(ERR_UPDATE_COOLDOWN, e))?;

        tx.commit()
            .await
            .map_err(|e| CooldownError::storage(ERR_COMMIT_TRANSACTION, e))?;

        debug!(action = %action, user_id = %user_id, "Cooldown enforced successfully");
        Ok(value)
    }

    /// Forget the last use of `action` by `user_id`. Absent records are fine.
    pub async fn reset_cooldown(&self, user_id: &str, action: &str) -> CooldownResult<()> {
        let key = CooldownKey::new(user_id, action);
        let existed = self
            .store
            .delete_cooldown(&key)
            .await
            .map_err(|e| CooldownError::storage(ERR_RESET_COOLDOWN, e))?;
        debug!(action = %action, user_id = %user_id, existed, "Cooldown reset");
        Ok(())
    }

    /// When `user_id` last performed `action`, if ever.
    pub async fn get_last_used(
        &self,
        user_id: &str,
        action: &str,
    ) -> CooldownResult<Option<DateTime<Utc>>> {
        let record = self
            .store
            .get_cooldown(&CooldownKey::new(user_id, action))
            .await
            .map_err(|e| CooldownError::storage(ERR_GET_LAST_USED, e))?;
        Ok(record.map(|r| r.last_used_at))
    }

    /// Every recorded action for `user_id` with its current status.
    ///
    /// Dev mode reports every action as ready, matching `check_cooldown`.
    pub async fn list_cooldowns(
        &self,
        user_id: &str,
    ) -> CooldownResult<Vec<(CooldownRecord, CooldownStatus)>> {
        let records = self
            .store
            .list_cooldowns(user_id)
            .await
            .map_err(|e| CooldownError::storage(ERR_LIST_COOLDOWNS, e))?;

        let now = self.clock.now();
        let mut statuses = Vec::with_capacity(records.len());
        for record in records {
            let status = if self.dev_mode() {
                CooldownStatus::READY
            } else {
                let duration = self.resolver.effective_cooldown(record.action()).await;
                CooldownStatus::evaluate(now, Some(record.last_used_at), duration)
            };
            statuses.push((record, status));
        }
        Ok(statuses)
    }
}
