//! # Tick Arithmetic
//!
//! A tick is 100 nanoseconds. Tick zero is 0001-01-01T00:00:00Z, so every
//! timestamp of interest is a positive `i64` whose 19-digit decimal form sorts
//! chronologically.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;

use crate::errors::TimeError;

/// Signed count of 100ns intervals since 0001-01-01T00:00:00Z.
pub type Ticks = i64;

pub const TICKS_PER_MILLISECOND: Ticks = 10_000;
pub const TICKS_PER_SECOND: Ticks = 1_000 * TICKS_PER_MILLISECOND;
pub const TICKS_PER_MINUTE: Ticks = 60 * TICKS_PER_SECOND;

/// Ticks at 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_TICKS: Ticks = 621_355_968_000_000_000;

/// Ticks at 9999-12-31T23:59:59.9999999Z, the last representable instant.
pub const MAX_TICKS: Ticks = 3_155_378_975_999_999_999;

/// Convert a Unix millisecond timestamp (as embedded in feed records) to ticks.
pub fn ticks_from_unix_millis(millis: i64) -> Option<Ticks> {
    millis
        .checked_mul(TICKS_PER_MILLISECOND)?
        .checked_add(UNIX_EPOCH_TICKS)
}

/// Convert a span of wall time to ticks, saturating at `Ticks::MAX`.
pub fn ticks_from_duration(duration: Duration) -> Ticks {
    let ticks = duration.as_nanos() / 100;
    Ticks::try_from(ticks).unwrap_or(Ticks::MAX)
}

/// Convert a non-negative tick span back to a `Duration`.
pub fn duration_from_ticks(ticks: Ticks) -> Duration {
    let ticks = u64::try_from(ticks).unwrap_or(0);
    Duration::from_nanos(ticks.saturating_mul(100))
}

pub fn datetime_to_ticks(dt: DateTime<Utc>) -> Ticks {
    dt.timestamp() * TICKS_PER_SECOND
        + Ticks::from(dt.timestamp_subsec_nanos() / 100)
        + UNIX_EPOCH_TICKS
}

pub fn ticks_to_datetime(ticks: Ticks) -> Result<DateTime<Utc>, TimeError> {
    let since_epoch = ticks - UNIX_EPOCH_TICKS;
    let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = since_epoch.rem_euclid(TICKS_PER_SECOND) * 100;
    DateTime::from_timestamp(secs, nanos as u32).ok_or(TimeError::OutOfRange { ticks })
}

/// Render ticks as RFC 3339 for log lines; falls back to the raw number.
pub fn format_ticks(ticks: Ticks) -> String {
    ticks_to_datetime(ticks)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|_| ticks.to_string())
}

/// Largest multiple of `size` that is `<= ticks` (epoch-grid alignment).
pub fn align_down(ticks: Ticks, size: Ticks) -> Ticks {
    debug_assert!(size > 0);
    ticks - ticks.rem_euclid(size)
}

/// Current wall-clock time in ticks.
pub fn now_ticks() -> Ticks {
    datetime_to_ticks(Utc::now())
}
