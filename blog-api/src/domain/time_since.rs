use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

const UNITS: [(i64, &str); 6] = [
    (YEAR, "year"),
    (MONTH, "month"),
    (WEEK, "week"),
    (DAY, "day"),
    (HOUR, "hour"),
    (MINUTE, "minute"),
];

/// Human readable distance between `from` and `now`, at most two adjacent
/// units: "3 days", "1 week, 2 days", "0 minutes".
pub(crate) fn time_since(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - from).num_seconds();
    if elapsed < MINUTE {
        return pluralize(0, "minute");
    }

    let Some(index) = UNITS.iter().position(|(seconds, _)| elapsed >= *seconds) else {
        return pluralize(0, "minute");
    };

    let (seconds, name) = UNITS[index];
    let count = elapsed / seconds;
    let mut result = pluralize(count, name);

    if let Some((next_seconds, next_name)) = UNITS.get(index + 1) {
        let next_count = (elapsed - count * seconds) / next_seconds;
        if next_count > 0 {
            result.push_str(", ");
            result.push_str(&pluralize(next_count, next_name));
        }
    }

    result
}

/// Same as [`time_since`] against the current clock, with an " ago" suffix.
pub(crate) fn ago(from: DateTime<Utc>) -> String {
    format!("{} ago", time_since(from, Utc::now()))
}

fn pluralize(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
