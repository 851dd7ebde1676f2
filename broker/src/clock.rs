//! C9 Clock: time behind a trait so expiry/TTL logic can be driven
//! deterministically in tests (`spec.md` §8's Janitor-liveness and
//! claim/release properties) instead of sleeping in real wall-clock time.
//! The reference service calls `OffsetDateTime::now_utc()` directly
//! everywhere; this is the one place we generalise behind a trait.

use parking_lot::RwLock;
use time::OffsetDateTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Test double: starts at a fixed instant and only moves when told to.
pub struct FixedClock(RwLock<OffsetDateTime>);

impl FixedClock {
    pub fn new(at: OffsetDateTime) -> Self {
        Self(RwLock::new(at))
    }

    pub fn advance(&self, duration: time::Duration) {
        let mut guard = self.0.write();
        *guard += duration;
    }

    pub fn set(&self, at: OffsetDateTime) {
        *self.0.write() = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.0.read()
    }
}
