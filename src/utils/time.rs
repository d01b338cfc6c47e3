//! Time and timestamp utilities

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Current wall-clock time in UTC
pub fn current_time() -> DateTime<Utc> {
    Utc::now()
}

/// Start of a sliding window of length `window` ending at `now`
///
/// Saturates at the earliest representable instant instead of overflowing.
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Instant `minutes` before `now`
pub fn minutes_before(now: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    now - TimeDelta::minutes(minutes as i64)
}
