//! Cooldown Gate: at most one success per (user, action) per cooldown window.
//!
//! The gate sits in front of arbitrary caller work. Concurrent callers for the
//! same user and action (retries, double-clicks, bots racing each other) may
//! all arrive before any record exists; exactly one of them runs its work.
//!
//! ## Enforcement protocol
//!
//! 1. **Fast path**: an unlocked read of `last_used_at`. Rejects the common
//!    "still cooling down" case without touching any lock.
//! 2. **Bypass**: in dev mode the work runs directly and usage is still
//!    recorded so it stays observable.
//! 3. **Slow path**: open a transaction, take the store's advisory lock on
//!    `sha256(user_id ":" action)`, re-read, run the work, upsert the new
//!    timestamp and commit. The lock needs no existing record, and the commit
//!    (or rollback on any failure or cancellation) releases it.
//!
//! Correctness rests entirely on the slow path; the fast path is an
//! optimization whose reads may race with concurrent commits.
//!
//! ## Effective duration
//!
//! Each check resolves the cooldown length anew: configured override, then the
//! built-in per-action default, then the global default. Actions mapped to a
//! progression feature ask the [`ProgressionService`] for a reduced value and
//! silently keep the base length if that lookup fails.

pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod gate;
pub mod key;
pub mod mocks;
pub mod status;
pub mod traits;

pub use clock::{Clock, SystemClock};
pub use config::{
    GateConfig, ACTION_SEARCH, DEFAULT_COOLDOWN, FEATURE_SEARCH_COOLDOWN_REDUCTION,
};
pub use cooldown_storage::{CooldownKey, CooldownRecord, LockKey};
pub use duration::DurationResolver;
pub use error::{
    format_remaining, CooldownError, CooldownErrorKind, CooldownResult, ProgressionError,
};
pub use gate::CooldownGate;
pub use key::{lock_key, lock_key_for, HASH_SEPARATOR};
pub use mocks::{ManualClock, MockProgressionService};
pub use status::CooldownStatus;
pub use traits::ProgressionService;
