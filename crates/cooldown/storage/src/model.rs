use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a cooldown record: one per (user, action) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CooldownKey {
    pub user_id: String,
    pub action: String,
}

impl CooldownKey {
    pub fn new(user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user_id, self.action)
    }
}

/// Persistent cooldown record. `last_used_at` is the only mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownRecord {
    #[serde(flatten)]
    pub key: CooldownKey,
    pub last_used_at: DateTime<Utc>,
}

impl CooldownRecord {
    pub fn new(key: CooldownKey, last_used_at: DateTime<Utc>) -> Self {
        Self { key, last_used_at }
    }

    pub fn user_id(&self) -> &str {
        &self.key.user_id
    }

    pub fn action(&self) -> &str {
        &self.key.action
    }
}

/// Advisory lock key.
///
/// Always non-negative so it maps onto a Postgres `BIGINT` without sign
/// surprises; the value carries no meaning beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LockKey(i64);

impl LockKey {
    const POSITIVE_MASK: u64 = 0x7FFF_FFFF_FFFF_FFFF;

    /// Build a key from raw bits, clearing the sign bit.
    pub fn from_bits(bits: u64) -> Self {
        Self((bits & Self::POSITIVE_MASK) as i64)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
