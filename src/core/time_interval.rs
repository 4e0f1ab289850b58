//! UTC calendar intervals used for time ticks, `nice` rounding and monthly
//! histogram thresholds.
//!
//! Boundaries are whole seconds. Stepped intervals are aligned on the
//! calendar field (`minute % 15 == 0`, `month % 3 == 0`, ...) rather than on
//! the distance from an arbitrary origin, so two axes over different spans
//! still agree on where a boundary falls.

use chrono::{DateTime, Datelike, Months, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ticks::tick_step;

const SECOND: i64 = 1;
const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 7 * DAY;
const MONTH_APPROX: i64 = 30 * DAY;
const YEAR_APPROX: i64 = 365 * DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    /// Sunday-based weeks.
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub unit: TimeUnit,
    pub step: u32,
}

/// Candidate tick intervals, ordered by approximate duration.
const TICK_INTERVALS: [(TimeUnit, u32, i64); 18] = [
    (TimeUnit::Second, 1, SECOND),
    (TimeUnit::Second, 5, 5 * SECOND),
    (TimeUnit::Second, 15, 15 * SECOND),
    (TimeUnit::Second, 30, 30 * SECOND),
    (TimeUnit::Minute, 1, MINUTE),
    (TimeUnit::Minute, 5, 5 * MINUTE),
    (TimeUnit::Minute, 15, 15 * MINUTE),
    (TimeUnit::Minute, 30, 30 * MINUTE),
    (TimeUnit::Hour, 1, HOUR),
    (TimeUnit::Hour, 3, 3 * HOUR),
    (TimeUnit::Hour, 6, 6 * HOUR),
    (TimeUnit::Hour, 12, 12 * HOUR),
    (TimeUnit::Day, 1, DAY),
    (TimeUnit::Day, 2, 2 * DAY),
    (TimeUnit::Week, 1, WEEK),
    (TimeUnit::Month, 1, MONTH_APPROX),
    (TimeUnit::Month, 3, 3 * MONTH_APPROX),
    (TimeUnit::Year, 1, YEAR_APPROX),
];

/// What a time axis should step by for a requested tick count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickInterval {
    Calendar(TimeInterval),
    /// Span too short for whole seconds; fall back to decimal seconds.
    SubSecond,
}

impl TimeInterval {
    #[must_use]
    pub const fn new(unit: TimeUnit, step: u32) -> Self {
        Self { unit, step }
    }

    #[must_use]
    pub const fn months() -> Self {
        Self::new(TimeUnit::Month, 1)
    }

    /// Latest boundary `<= time`.
    #[must_use]
    pub fn floor(self, time: f64) -> Option<f64> {
        let mut boundary = floor_unit(self.unit, to_whole_seconds(time.floor())?)?;
        while !self.is_aligned(boundary)? {
            boundary = offset_unit(self.unit, boundary, -1)?;
        }
        Some(boundary as f64)
    }

    /// Earliest boundary `>= time`.
    #[must_use]
    pub fn ceil(self, time: f64) -> Option<f64> {
        let floor = self.floor(time)?;
        if floor >= time {
            return Some(floor);
        }
        self.next_boundary(floor as i64).map(|boundary| boundary as f64)
    }

    /// Boundaries in `[start, stop)`, ascending.
    #[must_use]
    pub fn range(self, start: f64, stop: f64) -> Vec<f64> {
        let mut out = Vec::new();
        if !start.is_finite() || !stop.is_finite() || stop <= start {
            return out;
        }
        let Some(first) = self.ceil(start) else {
            return out;
        };
        let mut current = first as i64;
        while (current as f64) < stop {
            out.push(current as f64);
            match self.next_boundary(current) {
                Some(next) if next > current => current = next,
                _ => break,
            }
        }
        out
    }

    fn next_boundary(self, boundary: i64) -> Option<i64> {
        let mut next = offset_unit(self.unit, boundary, 1)?;
        while !self.is_aligned(next)? {
            next = offset_unit(self.unit, next, 1)?;
        }
        Some(next)
    }

    fn is_aligned(self, boundary: i64) -> Option<bool> {
        let step = i64::from(self.step.max(1));
        if step == 1 {
            return Some(true);
        }
        let datetime = datetime_from_seconds(boundary)?;
        let field = match self.unit {
            TimeUnit::Second => i64::from(datetime.second()),
            TimeUnit::Minute => i64::from(datetime.minute()),
            TimeUnit::Hour => i64::from(datetime.hour()),
            TimeUnit::Day => i64::from(datetime.day0()),
            TimeUnit::Week => return Some(true),
            TimeUnit::Month => i64::from(datetime.month0()),
            TimeUnit::Year => i64::from(datetime.year()),
        };
        Some(field.rem_euclid(step) == 0)
    }
}

/// Every UTC month boundary in `[start, stop)`.
#[must_use]
pub fn month_starts(start: f64, stop: f64) -> Vec<f64> {
    TimeInterval::months().range(start, stop)
}

/// Picks the calendar interval whose duration is closest to `span / count`.
#[must_use]
pub fn tick_interval(start: f64, stop: f64, count: usize) -> TickInterval {
    let count = count.max(1);
    let target = (stop - start).abs() / count as f64;

    let index = TICK_INTERVALS.partition_point(|&(_, _, duration)| duration as f64 <= target);
    if index == TICK_INTERVALS.len() {
        let years = tick_step(
            start / YEAR_APPROX as f64,
            stop / YEAR_APPROX as f64,
            count,
        )
        .abs()
        .floor()
        .max(1.0);
        let step = if years > f64::from(u32::MAX) {
            u32::MAX
        } else {
            years as u32
        };
        return TickInterval::Calendar(TimeInterval::new(TimeUnit::Year, step));
    }
    if index == 0 {
        return TickInterval::SubSecond;
    }

    let (below_unit, below_step, below_duration) = TICK_INTERVALS[index - 1];
    let (above_unit, above_step, above_duration) = TICK_INTERVALS[index];
    let pick_below = target / (below_duration as f64) < (above_duration as f64) / target;
    let (unit, step) = if pick_below {
        (below_unit, below_step)
    } else {
        (above_unit, above_step)
    };
    TickInterval::Calendar(TimeInterval::new(unit, step))
}

fn to_whole_seconds(time: f64) -> Option<i64> {
    if !time.is_finite() || time > (i64::MAX as f64) || time < (i64::MIN as f64) {
        return None;
    }
    Some(time as i64)
}

fn datetime_from_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
}

fn floor_unit(unit: TimeUnit, seconds: i64) -> Option<i64> {
    let fixed = |width: i64| seconds.div_euclid(width) * width;
    Some(match unit {
        TimeUnit::Second => seconds,
        TimeUnit::Minute => fixed(MINUTE),
        TimeUnit::Hour => fixed(HOUR),
        TimeUnit::Day => fixed(DAY),
        TimeUnit::Week => {
            let day = seconds.div_euclid(DAY);
            // 1970-01-01 was a Thursday.
            let days_since_sunday = (day + 4).rem_euclid(7);
            (day - days_since_sunday) * DAY
        }
        TimeUnit::Month => {
            let datetime = datetime_from_seconds(seconds)?;
            midnight_seconds(NaiveDate::from_ymd_opt(datetime.year(), datetime.month(), 1)?)?
        }
        TimeUnit::Year => {
            let datetime = datetime_from_seconds(seconds)?;
            midnight_seconds(NaiveDate::from_ymd_opt(datetime.year(), 1, 1)?)?
        }
    })
}

fn offset_unit(unit: TimeUnit, boundary: i64, count: i32) -> Option<i64> {
    let fixed = |width: i64| boundary.checked_add(width.checked_mul(i64::from(count))?);
    match unit {
        TimeUnit::Second => fixed(SECOND),
        TimeUnit::Minute => fixed(MINUTE),
        TimeUnit::Hour => fixed(HOUR),
        TimeUnit::Day => fixed(DAY),
        TimeUnit::Week => fixed(WEEK),
        TimeUnit::Month => {
            let date = datetime_from_seconds(boundary)?.date_naive();
            let months = Months::new(count.unsigned_abs());
            let shifted = if count >= 0 {
                date.checked_add_months(months)?
            } else {
                date.checked_sub_months(months)?
            };
            midnight_seconds(shifted)
        }
        TimeUnit::Year => {
            let date = datetime_from_seconds(boundary)?.date_naive();
            midnight_seconds(NaiveDate::from_ymd_opt(date.year() + count, 1, 1)?)
        }
    }
}

fn midnight_seconds(date: NaiveDate) -> Option<i64> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}
