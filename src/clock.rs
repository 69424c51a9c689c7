//! Time source for every expiry decision in the service.
//!
//! Throttle windows, lockouts and DSAR deadlines all read "now" through
//! [`Clock`] so tests can drive time forward without sleeping.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};

/// A source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock shared between the HTTP layer, the stores and the sweepers.
pub type SharedClock = Arc<dyn Clock>;

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward (or backward, for a negative delta).
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().expect("manual clock mutex poisoned");
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().expect("manual clock mutex poisoned") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("manual clock mutex poisoned")
    }
}

/// Longest window, lockout or attempt window the service accepts: one year.
pub const MAX_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

/// A configured period in seconds, clamped to [`MAX_PERIOD_SECS`].
pub fn period_from_secs(secs: u64) -> TimeDelta {
    let secs = i64::try_from(secs.min(MAX_PERIOD_SECS)).unwrap_or_default();
    TimeDelta::try_seconds(secs).unwrap_or_default()
}

/// `now + period`, saturating at the latest representable instant.
pub fn saturating_add(now: DateTime<Utc>, period: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(period)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Ceiling division of a signed delta by a positive unit, at nanosecond
/// precision. `ceil_div(-4.5s, 1s) == -4`.
///
/// Deltas too large for nanoseconds (about 292 years) fall back to
/// milliseconds.
pub fn ceil_div(delta: TimeDelta, unit: TimeDelta) -> i64 {
    match (delta.num_nanoseconds(), unit.num_nanoseconds()) {
        (Some(n), Some(u)) => ceil_div_i64(n, u.max(1)),
        _ => ceil_div_i64(delta.num_milliseconds(), unit.num_milliseconds().max(1)),
    }
}

fn ceil_div_i64(n: i64, unit: i64) -> i64 {
    let quotient = n.div_euclid(unit);
    if n.rem_euclid(unit) > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// Whole seconds until `deadline`, rounded up. Zero once it has passed.
pub fn secs_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from(ceil_div(deadline - now, TimeDelta::seconds(1))).unwrap_or(0)
}
