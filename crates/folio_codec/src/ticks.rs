//! Tick timestamps.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Number of 100-nanosecond ticks per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Number of ticks in one civil day.
pub const TICKS_PER_DAY: i64 = TICKS_PER_SECOND * 86_400;

/// A timestamp encoded as 100-nanosecond intervals since the Unix epoch.
///
/// This is the only timestamp representation that touches disk. `Ticks`
/// are totally ordered; [`Ticks::MAX`] is the sentinel for "not yet", used
/// as the publish time of articles that are still under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticks(i64);

impl Ticks {
    /// The epoch itself.
    pub const ZERO: Ticks = Ticks(0);

    /// Sentinel for events that have not happened yet.
    pub const MAX: Ticks = Ticks(i64::MAX);

    /// Wraps a raw tick count.
    #[must_use]
    pub const fn from_raw(ticks: i64) -> Self {
        Ticks(ticks)
    }

    /// Returns the raw tick count.
    #[must_use]
    pub const fn as_raw(self) -> i64 {
        self.0
    }

    /// Builds a timestamp from whole seconds since the Unix epoch.
    #[must_use]
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Ticks(seconds * TICKS_PER_SECOND)
    }

    /// The current wall-clock time.
    ///
    /// Times before the epoch clamp to [`Ticks::ZERO`].
    #[must_use]
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => Ticks::from_duration_saturating(elapsed),
            Err(_) => Ticks::ZERO,
        }
    }

    fn from_duration_saturating(d: Duration) -> Self {
        let ticks = d.as_nanos() / 100;
        Ticks(i64::try_from(ticks).unwrap_or(i64::MAX))
    }

    /// Adds a duration, saturating at [`Ticks::MAX`].
    #[must_use]
    pub fn saturating_add(self, d: Duration) -> Self {
        let delta = i64::try_from(d.as_nanos() / 100).unwrap_or(i64::MAX);
        Ticks(self.0.saturating_add(delta))
    }

    /// Subtracts a duration, saturating at [`Ticks::ZERO`].
    #[must_use]
    pub fn saturating_sub(self, d: Duration) -> Self {
        let delta = i64::try_from(d.as_nanos() / 100).unwrap_or(i64::MAX);
        Ticks(self.0.saturating_sub(delta).max(0))
    }

    /// Whole seconds since the Unix epoch (toward negative infinity).
    #[must_use]
    pub const fn unix_seconds(self) -> i64 {
        self.0.div_euclid(TICKS_PER_SECOND)
    }

    /// Sub-second remainder in nanoseconds.
    #[must_use]
    pub const fn subsec_nanos(self) -> u32 {
        (self.0.rem_euclid(TICKS_PER_SECOND) * 100) as u32
    }

    /// The civil day this instant falls on, as days since the Unix epoch.
    ///
    /// Used for front-page day grouping and daily log files. Note that
    /// `Ticks::MAX` still maps to an ordinary (if absurdly distant) day
    /// number, so sentinel timestamps group like any other instant.
    #[must_use]
    pub const fn day_number(self) -> i64 {
        self.0.div_euclid(TICKS_PER_DAY)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
