use std::time::Duration;

use cooldown_storage::StorageError;
use thiserror::Error;

/// Result type for gate operations.
pub type CooldownResult<T> = Result<T, CooldownError>;

pub(crate) const ERR_CHECK_COOLDOWN: &str = "failed to check cooldown";
pub(crate) const ERR_BEGIN_TRANSACTION: &str = "failed to begin transaction";
pub(crate) const ERR_ACQUIRE_LOCK: &str = "failed to acquire advisory lock";
pub(crate) const ERR_GET_COOLDOWN_TX: &str = "failed to get cooldown within transaction";
pub(crate) const ERR_UPDATE_COOLDOWN: &str = "failed to update cooldown";
pub(crate) const ERR_COMMIT_TRANSACTION: &str = "failed to commit cooldown transaction";
pub(crate) const ERR_RESET_COOLDOWN: &str = "failed to reset cooldown";
pub(crate) const ERR_GET_LAST_USED: &str = "failed to get last used";
pub(crate) const ERR_LIST_COOLDOWNS: &str = "failed to list cooldowns";

/// Errors produced by the Cooldown Gate.
///
/// Caller work failures never appear here: `enforce_cooldown` hands them back
/// untouched in the caller's own error type.
#[derive(Error, Debug)]
pub enum CooldownError {
    /// The action is still cooling down. Expected, not a fault.
    #[error("You can {action} again in {}", format_remaining(.remaining))]
    OnCooldown { action: String, remaining: Duration },

    /// The store failed; `context` names the step.
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StorageError,
    },
}

/// Variant discriminant, comparable without looking at field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownErrorKind {
    OnCooldown,
    Storage,
}

impl CooldownError {
    pub fn on_cooldown(action: impl Into<String>, remaining: Duration) -> Self {
        Self::OnCooldown {
            action: action.into(),
            remaining,
        }
    }

    pub(crate) fn storage(context: &'static str, source: StorageError) -> Self {
        Self::Storage { context, source }
    }

    pub fn kind(&self) -> CooldownErrorKind {
        match self {
            Self::OnCooldown { .. } => CooldownErrorKind::OnCooldown,
            Self::Storage { .. } => CooldownErrorKind::Storage,
        }
    }

    /// Whether this is a cooldown rejection, whatever the action or remaining time.
    pub fn is_on_cooldown(&self) -> bool {
        self.kind() == CooldownErrorKind::OnCooldown
    }

    /// Remaining time for cooldown rejections.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::OnCooldown { remaining, .. } => Some(*remaining),
            Self::Storage { .. } => None,
        }
    }
}

/// Errors from the progression collaborator. Never surfaced by the gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("progression service unavailable: {0}")]
    Unavailable(String),

    #[error("unknown progression feature: {0}")]
    UnknownFeature(String),

    #[error("progression lookup failed: {0}")]
    Other(String),
}

/// "2m 30s" above a minute, "45s" below. Partial seconds round up so a
/// pending cooldown never renders as "0s".
pub fn format_remaining(remaining: &Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs = secs.saturating_add(1);
    }
    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
