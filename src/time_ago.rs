//! Relative rendering of Unix timestamps ("5 minutes ago").

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Render `time` (Unix seconds) relative to the current moment.
#[must_use]
pub fn from_unix(time: i64) -> String {
    relative_to(time, Utc::now())
}

/// Render `time` relative to `now`. Timestamps in the future clamp to
/// "just now" rather than counting backwards.
fn relative_to(time: i64, now: DateTime<Utc>) -> String {
    let elapsed = (now.timestamp() - time).max(0);
    if elapsed < MINUTE {
        "just now".to_string()
    } else if elapsed < HOUR {
        count(elapsed / MINUTE, "minute")
    } else if elapsed < DAY {
        count(elapsed / HOUR, "hour")
    } else if elapsed < WEEK {
        count(elapsed / DAY, "day")
    } else if elapsed < MONTH {
        count(elapsed / WEEK, "week")
    } else if elapsed < YEAR {
        count(elapsed / MONTH, "month")
    } else {
        count(elapsed / YEAR, "year")
    }
}

fn count(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(unix: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(unix, 0).unwrap()
    }

    #[test]
    fn test_just_now() {
        assert_eq!(relative_to(1_000, at(1_000)), "just now");
        assert_eq!(relative_to(1_000, at(1_059)), "just now");
    }

    #[test]
    fn test_future_timestamps_clamp() {
        assert_eq!(relative_to(2_000, at(1_000)), "just now");
    }

    #[test]
    fn test_minutes_and_hours() {
        assert_eq!(relative_to(0, at(MINUTE)), "1 minute ago");
        assert_eq!(relative_to(0, at(5 * MINUTE + 30)), "5 minutes ago");
        assert_eq!(relative_to(0, at(HOUR)), "1 hour ago");
        assert_eq!(relative_to(0, at(23 * HOUR)), "23 hours ago");
    }

    #[test]
    fn test_days_weeks_months_years() {
        assert_eq!(relative_to(0, at(DAY)), "1 day ago");
        assert_eq!(relative_to(0, at(6 * DAY)), "6 days ago");
        assert_eq!(relative_to(0, at(WEEK)), "1 week ago");
        assert_eq!(relative_to(0, at(3 * WEEK)), "3 weeks ago");
        assert_eq!(relative_to(0, at(MONTH)), "1 month ago");
        assert_eq!(relative_to(0, at(11 * MONTH)), "11 months ago");
        assert_eq!(relative_to(0, at(YEAR)), "1 year ago");
        assert_eq!(relative_to(0, at(3 * YEAR)), "3 years ago");
    }

    #[test]
    fn test_tier_boundaries() {
        // One second under each boundary stays in the lower unit.
        assert_eq!(relative_to(0, at(HOUR - 1)), "59 minutes ago");
        assert_eq!(relative_to(0, at(DAY - 1)), "23 hours ago");
        assert_eq!(relative_to(0, at(WEEK - 1)), "6 days ago");
    }
}
