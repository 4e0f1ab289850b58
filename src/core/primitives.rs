use std::fmt::Write as _;

use chrono::{DateTime, Utc};

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Converts unix seconds back to a UTC datetime at millisecond precision.
///
/// Returns `None` for non-finite or out-of-range input.
#[must_use]
pub fn unix_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).round();
    if millis > (i64::MAX as f64) || millis < (i64::MIN as f64) {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

/// `(min, max)` over the finite values of an iterator.
#[must_use]
pub fn finite_extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut extent: Option<(f64, f64)> = None;
    for value in values.into_iter().filter(|value| value.is_finite()) {
        extent = Some(match extent {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
    }
    extent
}

/// Formats unix seconds in UTC with a strftime pattern.
///
/// Empty for unrepresentable times or an invalid pattern.
#[must_use]
pub fn format_time_tick(seconds: f64, pattern: &str) -> String {
    let Some(time) = unix_seconds_to_datetime(seconds) else {
        return String::new();
    };
    let mut out = String::new();
    match write!(out, "{}", time.format(pattern)) {
        Ok(()) => out,
        Err(_) => String::new(),
    }
}
