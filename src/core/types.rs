use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, unix_seconds_to_datetime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Geographic coordinate in degrees, longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One observed event.
///
/// `time` is UTC unix seconds; `NaN` marks a date that failed to parse.
/// `measure` is `NaN` when the source count was not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub time: f64,
    pub measure: f64,
    pub location: GeoPoint,
}

impl Record {
    #[must_use]
    pub const fn new(time: f64, measure: f64, location: GeoPoint) -> Self {
        Self {
            time,
            measure,
            location,
        }
    }

    #[must_use]
    pub fn at(time: DateTime<Utc>, measure: f64, location: GeoPoint) -> Self {
        Self::new(datetime_to_unix_seconds(time), measure, location)
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        unix_seconds_to_datetime(self.time)
    }

    /// True when every field carries a usable value.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.time.is_finite()
            && self.measure.is_finite()
            && self.measure >= 0.0
            && self.location.is_finite()
    }
}

/// Accessor for the histogram/filter time field.
#[must_use]
pub fn record_time(record: &Record) -> f64 {
    record.time
}

/// Accessor for the aggregated quantity.
#[must_use]
pub fn record_measure(record: &Record) -> f64 {
    record.measure
}

/// Immutable, cheaply clonable sequence of records.
///
/// Derived views (filtered subsets) are new sequences; a dataset is never
/// edited after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Arc<[Record]>,
}

impl Dataset {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Largest finite measure, ignoring malformed rows.
    #[must_use]
    pub fn max_measure(&self) -> Option<f64> {
        self.records
            .iter()
            .map(record_measure)
            .filter(|value| value.is_finite())
            .fold(None, |acc, value| match acc {
                Some(current) if current >= value => Some(current),
                _ => Some(value),
            })
    }

    /// `(min, max)` over finite record times.
    #[must_use]
    pub fn time_extent(&self) -> Option<(f64, f64)> {
        crate::core::finite_extent(self.records.iter().map(record_time))
    }
}

impl Deref for Dataset {
    type Target = [Record];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
