//! Relative time labels for notification timestamps.

use chrono::{DateTime, TimeZone, Utc};

use crate::types::JUST_NOW_LABEL;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Formats `timestamp_ms` relative to `now`.
///
/// Under a minute (or in the future) is "Just now"; then minutes, hours and
/// days up to a week; older timestamps show their calendar date (UTC).
pub fn relative_label(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let elapsed = now.timestamp_millis().saturating_sub(timestamp_ms);

    if elapsed < MINUTE_MS {
        JUST_NOW_LABEL.to_string()
    } else if elapsed < HOUR_MS {
        plural(elapsed / MINUTE_MS, "minute")
    } else if elapsed < DAY_MS {
        plural(elapsed / HOUR_MS, "hour")
    } else if elapsed <= WEEK_MS {
        plural(elapsed / DAY_MS, "day")
    } else {
        match Utc.timestamp_millis_opt(timestamp_ms).single() {
            Some(created) => created.format("%Y-%m-%d").to_string(),
            None => "A long time ago".to_string(),
        }
    }
}
