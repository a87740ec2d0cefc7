use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub on_cooldown: bool,
    pub remaining: Duration,
}

impl CooldownStatus {
    pub const READY: Self = Self {
        on_cooldown: false,
        remaining: Duration::ZERO,
    };

    pub fn active(remaining: Duration) -> Self {
        Self {
            on_cooldown: true,
            remaining,
        }
    }

    /// Evaluate a window of `duration` that started at `last_used`.
    ///
    /// Expiry is inclusive: exactly `duration` after `last_used` is ready. A
    /// `last_used` in the future counts the skew as extra remaining time.
    pub fn evaluate(
        now: DateTime<Utc>,
        last_used: Option<DateTime<Utc>>,
        duration: Duration,
    ) -> Self {
        let Some(last_used) = last_used else {
            return Self::READY;
        };
        match (now - last_used).to_std() {
            Ok(elapsed) if elapsed >= duration => Self::READY,
            Ok(elapsed) => Self::active(duration - elapsed),
            Err(_) => {
                let skew = (last_used - now).to_std().unwrap_or_default();
                Self::active(duration.saturating_add(skew))
            }
        }
    }
}
