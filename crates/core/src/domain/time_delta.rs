// Time Delta - signed microsecond durations for the queue clock

use std::fmt;
use std::time::Duration;

const MICROS_PER_MILLI: i64 = 1_000;
const MICROS_PER_SECOND: i64 = 1_000_000;

/// Signed duration with microsecond resolution.
///
/// `PLUS_INFINITY` is a sentinel meaning "no bound" and is what an idle
/// worker waits for when nothing is scheduled. Arithmetic saturates, so an
/// infinite delay never wraps into the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeDelta {
    us: i64,
}

impl TimeDelta {
    pub const ZERO: TimeDelta = TimeDelta { us: 0 };
    pub const PLUS_INFINITY: TimeDelta = TimeDelta { us: i64::MAX };

    pub const fn micros(us: i64) -> Self {
        Self { us }
    }

    pub const fn millis(ms: i64) -> Self {
        Self {
            us: ms.saturating_mul(MICROS_PER_MILLI),
        }
    }

    pub const fn seconds(s: i64) -> Self {
        Self {
            us: s.saturating_mul(MICROS_PER_SECOND),
        }
    }

    /// Whole microseconds
    pub const fn us(&self) -> i64 {
        self.us
    }

    /// Whole milliseconds, truncated toward zero
    pub const fn ms(&self) -> i64 {
        self.us / MICROS_PER_MILLI
    }

    /// Whole milliseconds, rounded up
    ///
    /// Negative values clamp to zero. Sleeping on a rounded-down bound would
    /// wake the worker before its timer is due and make it spin.
    pub const fn ms_round_up(&self) -> i64 {
        if self.us <= 0 {
            return 0;
        }
        if self.is_plus_infinity() {
            return i64::MAX;
        }
        divide_round_up(self.us, MICROS_PER_MILLI)
    }

    pub const fn is_plus_infinity(&self) -> bool {
        self.us == i64::MAX
    }

    pub const fn is_zero(&self) -> bool {
        self.us == 0
    }

    /// Convert to a std duration; `None` for `PLUS_INFINITY`
    pub fn to_std(&self) -> Option<Duration> {
        if self.is_plus_infinity() {
            return None;
        }
        Some(Duration::from_micros(self.us.max(0) as u64))
    }

    pub const fn saturating_add(self, other: TimeDelta) -> TimeDelta {
        if self.is_plus_infinity() || other.is_plus_infinity() {
            return TimeDelta::PLUS_INFINITY;
        }
        TimeDelta {
            us: self.us.saturating_add(other.us),
        }
    }

    pub const fn saturating_sub(self, other: TimeDelta) -> TimeDelta {
        if self.is_plus_infinity() {
            return TimeDelta::PLUS_INFINITY;
        }
        TimeDelta {
            us: self.us.saturating_sub(other.us),
        }
    }
}

impl From<Duration> for TimeDelta {
    fn from(duration: Duration) -> Self {
        let us = i64::try_from(duration.as_micros()).unwrap_or(i64::MAX);
        Self { us }
    }
}

impl fmt::Display for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_plus_infinity() {
            write!(f, "+inf")
        } else if self.us % MICROS_PER_MILLI == 0 {
            write!(f, "{}ms", self.ms())
        } else {
            write!(f, "{}us", self.us)
        }
    }
}

/// Integer division rounding up. `dividend >= 0`, `divisor > 0`.
pub const fn divide_round_up(dividend: i64, divisor: i64) -> i64 {
    debug_assert!(dividend >= 0);
    debug_assert!(divisor > 0);

    let quotient = dividend / divisor;
    let remainder = dividend % divisor;
    quotient + if remainder > 0 { 1 } else { 0 }
}

/// Integer division rounding to the nearest value, halves rounding down for
/// even divisors. `dividend >= 0`, `divisor > 0`.
pub const fn divide_round_to_nearest(dividend: i64, divisor: i64) -> i64 {
    debug_assert!(dividend >= 0);
    debug_assert!(divisor > 0);

    let half_of_divisor = (divisor - 1) / 2;
    let quotient = dividend / divisor;
    let remainder = dividend % divisor;
    quotient + if remainder > half_of_divisor { 1 } else { 0 }
}
