//! Advisory lock keys for (user, action) pairs.
//!
//! The key is the first eight bytes of `sha256(user_id ":" action)` read
//! big-endian with the sign bit cleared. Any process computing it for the same
//! pair arrives at the same `BIGINT`, so gates in separate processes contend on
//! one Postgres advisory lock.

use cooldown_storage::{CooldownKey, LockKey};
use sha2::{Digest, Sha256};

pub const HASH_SEPARATOR: &str = ":";

pub fn lock_key(user_id: &str, action: &str) -> LockKey {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(HASH_SEPARATOR.as_bytes());
    hasher.update(action.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    LockKey::from_bits(u64::from_be_bytes(prefix))
}

pub fn lock_key_for(key: &CooldownKey) -> LockKey {
    lock_key(&key.user_id, &key.action)
}
