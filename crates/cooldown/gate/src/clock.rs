use std::fmt;

use chrono::{DateTime, Utc};

/// Source of "now" for cooldown arithmetic.
///
/// Production code uses [`SystemClock`]; tests inject
/// [`ManualClock`](crate::mocks::ManualClock) to step time deterministically.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
