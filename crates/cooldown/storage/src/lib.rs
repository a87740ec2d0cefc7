//! Cooldown storage abstractions.
//!
//! This crate defines the persistence contract used by the cooldown gate:
//! - one record per (user, action) holding the last successful use
//! - keyed point reads, upserts and deletes
//! - transactions carrying a store-native advisory lock keyed by value,
//!   independent of whether a record exists for that key
//!
//! Two adapters ship with the crate:
//! - [`memory::InMemoryCooldownStore`] for single-process deployments and tests,
//!   backed by a sharded lock table.
//! - `postgres::PostgresCooldownStore` (feature `postgres`) using
//!   `pg_advisory_xact_lock`, safe to share across many processes.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod lock_table;
pub mod memory;
mod model;
#[cfg(feature = "postgres")]
pub mod postgres;
mod traits;

pub use error::{StorageError, StorageResult};
pub use lock_table::{LockGuard, LockTable};
pub use model::{CooldownKey, CooldownRecord, LockKey};
pub use traits::{CooldownStore, CooldownTransaction};
