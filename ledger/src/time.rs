// Time types used by the ledger
//
// Lock maturity is evaluated against the timestamp handed out by a `Clock`.
// Hosts that execute operations in a globally ordered stream (block
// timestamps, replayed journals) should drive a `ManualClock`; `SystemClock`
// reads the wall clock and is only suitable for standalone embedding.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::token::{TokenError, TokenResult};

// Seconds timestamps used to determine it using its type
pub type TimestampSeconds = u64;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[inline]
pub fn get_current_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

// Return timestamp in seconds
pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}

/// Source of the current time for lock maturity checks
pub trait Clock {
    fn now(&self) -> TimestampSeconds;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimestampSeconds {
        get_current_time_in_seconds()
    }
}

/// Forward-only clock driven by the host
///
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: TimestampSeconds) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the clock forward by `seconds`, saturating at `u64::MAX`
    pub fn advance(&self, seconds: u64) -> TimestampSeconds {
        let previous = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(seconds))
            })
            .unwrap_or_else(|current| current);
        previous.saturating_add(seconds)
    }

    pub fn advance_days(&self, days: u64) -> TimestampSeconds {
        self.advance(days.saturating_mul(SECONDS_PER_DAY))
    }

    /// Jump to an absolute timestamp; going backwards is rejected
    pub fn set(&self, timestamp: TimestampSeconds) -> TokenResult<()> {
        self.now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (timestamp >= current).then_some(timestamp)
            })
            .map(|_| ())
            .map_err(|current| TokenError::ClockRegression {
                current,
                requested: timestamp,
            })
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimestampSeconds {
        self.now.load(Ordering::SeqCst)
    }
}
