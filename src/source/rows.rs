//! Row mapping from delimited text to [`Record`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Dataset, GeoPoint, Record, datetime_to_unix_seconds};
use crate::error::{AtlasError, AtlasResult};

/// Header name to cell text, in column order.
pub type RawRow = IndexMap<String, String>;

/// Column names feeding each record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowMapping {
    /// Cell holding `"lat, lon"`.
    pub coordinates: String,
    pub measure: String,
    pub date: String,
}

impl Default for RowMapping {
    fn default() -> Self {
        Self {
            coordinates: "Location Coordinates".to_owned(),
            measure: "Total Dead and Missing".to_owned(),
            date: "Reported Date".to_owned(),
        }
    }
}

/// What to do with rows whose values cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Keep the row with `NaN` in the unparseable fields.
    #[default]
    Keep,
    /// Drop rows that are not well formed.
    Skip,
}

impl RowMapping {
    /// Maps one row. Missing columns are an error; unparseable cells are not.
    pub fn map_row(&self, row: &RawRow) -> AtlasResult<Record> {
        let cell = |column: &str| {
            row.get(column)
                .map(String::as_str)
                .ok_or_else(|| AtlasError::InvalidData(format!("missing column `{column}`")))
        };
        let location = parse_coordinates(cell(&self.coordinates)?);
        let measure = coerce_number(cell(&self.measure)?);
        let time = parse_date(cell(&self.date)?)
            .map(datetime_to_unix_seconds)
            .unwrap_or(f64::NAN);
        Ok(Record::new(time, measure, location))
    }

    pub fn map_rows<'a>(
        &self,
        rows: impl IntoIterator<Item = &'a RawRow>,
        policy: MalformedRowPolicy,
    ) -> AtlasResult<Dataset> {
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (index, row) in rows.into_iter().enumerate() {
            let record = match (self.map_row(row), policy) {
                (Ok(record), _) => record,
                (Err(err), MalformedRowPolicy::Keep) => return Err(err),
                (Err(err), MalformedRowPolicy::Skip) => {
                    warn!(row = index, error = %err, "skipping row");
                    skipped += 1;
                    continue;
                }
            };
            if policy == MalformedRowPolicy::Skip && !record.is_well_formed() {
                skipped += 1;
                continue;
            }
            records.push(record);
        }
        debug!(records = records.len(), skipped, "rows mapped");
        Ok(Dataset::new(records))
    }
}

/// Parses delimited text with a header line into raw rows.
pub fn parse_csv_rows(text: &str, delimiter: u8) -> AtlasResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| AtlasError::InvalidData(format!("failed to read csv header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AtlasError::InvalidData(format!("failed to read csv row: {e}")))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_owned(), value.to_owned()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Parses comma-separated text and maps it to a dataset.
pub fn parse_dataset_csv(
    text: &str,
    mapping: &RowMapping,
    policy: MalformedRowPolicy,
) -> AtlasResult<Dataset> {
    let rows = parse_csv_rows(text, b',')?;
    mapping.map_rows(&rows, policy)
}

/// `"lat, lon"` to a longitude-first point; missing parts become `NaN`.
#[must_use]
pub fn parse_coordinates(cell: &str) -> GeoPoint {
    let mut parts = cell.split(',').map(coerce_number).rev();
    let lon = parts.next().unwrap_or(f64::NAN);
    let lat = parts.next().unwrap_or(f64::NAN);
    GeoPoint::new(lon, lat)
}

/// Numeric coercion with the lenient rules of browser number conversion.
///
/// Blank text is zero, surrounding whitespace is ignored, `0x`/`0o`/`0b`
/// prefixes and `Infinity` are accepted, anything else unparseable is `NaN`.
#[must_use]
pub fn coerce_number(cell: &str) -> f64 {
    let text = cell.trim();
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|value| value as f64)
                .unwrap_or(f64::NAN);
        }
    }
    // std accepts "inf"/"nan" spellings that must stay NaN here
    if text
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

const DATE_TIME_FORMATS: [&str; 3] = [
    "%d %b %Y %H:%M:%S GMT",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y", "%B %d, %Y"];

/// Parses the date formats seen in event exports, all interpreted as UTC.
#[must_use]
pub fn parse_date(cell: &str) -> Option<DateTime<Utc>> {
    let text = cell.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    // A weekday name that disagrees with the date must not reject the row.
    let text = strip_weekday(text);
    if let Ok(time) = DateTime::parse_from_rfc2822(text) {
        return Some(time.with_timezone(&Utc));
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Drops a leading `"Tue, "` style weekday name.
fn strip_weekday(text: &str) -> &str {
    match text.split_once(',') {
        Some((prefix, rest))
            if prefix.len() >= 3 && prefix.chars().all(|ch| ch.is_ascii_alphabetic()) =>
        {
            rest.trim_start()
        }
        _ => text,
    }
}
