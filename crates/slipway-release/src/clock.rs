//! Time source for commit timestamps.

use slipway_types::Timestamp;

/// Source of the current time.
///
/// Release preparation stamps commits through this trait so production
/// code can read the system clock while tests pin an instant and get
/// bit-identical commits.
pub trait Clock: Send + Sync {
    /// The current time, with the clock's UTC offset.
    fn now(&self) -> Timestamp;
}

/// Reads the system clock in the local timezone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = chrono::Local::now();
        Timestamp::new(now.timestamp(), now.offset().local_minus_utc())
    }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
