use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::ProgressionError;
use crate::traits::ProgressionService;

/// Mock progression service for testing.
///
/// Records every lookup so tests can assert how often, and with what, the
/// gate consulted it.
#[derive(Debug)]
pub struct MockProgressionService {
    behavior: Behavior,
    calls: Mutex<Vec<(String, f64)>>,
}

#[derive(Debug, Clone)]
enum Behavior {
    Fixed(f64),
    ReduceBy(HashMap<String, f64>),
    Fail(ProgressionError),
}

impl MockProgressionService {
    /// Always return `value` (nanoseconds for cooldowns), whatever the base.
    pub fn fixed(value: f64) -> Self {
        Self::with_behavior(Behavior::Fixed(value))
    }

    /// Subtract `amount` from the base for `feature_key`; other features pass
    /// the base through. Cooldown amounts are in nanoseconds.
    pub fn reduce_by(feature_key: impl Into<String>, amount: f64) -> Self {
        Self::with_behavior(Behavior::ReduceBy(HashMap::from([(
            feature_key.into(),
            amount,
        )])))
    }

    /// Fail every lookup.
    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail(ProgressionError::Unavailable(
            "mock progression offline".into(),
        )))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Lookups received so far, as (feature key, base value).
    pub fn calls(&self) -> Vec<(String, f64)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl ProgressionService for MockProgressionService {
    async fn modified_value(
        &self,
        feature_key: &str,
        base_value: f64,
    ) -> Result<f64, ProgressionError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((feature_key.to_string(), base_value));

        match &self.behavior {
            Behavior::Fixed(value) => Ok(*value),
            Behavior::ReduceBy(reductions) => Ok(reductions
                .get(feature_key)
                .map_or(base_value, |amount| base_value - amount)),
            Behavior::Fail(err) => Err(err.clone()),
        }
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: std::time::Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = now.checked_add_signed(by).unwrap_or(*now);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
