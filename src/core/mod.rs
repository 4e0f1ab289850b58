pub mod binning;
pub mod filter;
pub mod primitives;
pub mod scale;
pub mod ticks;
pub mod time_interval;
pub mod types;

pub use binning::{Bin, bin_records, max_bin_sum};
pub use filter::filter_records;
pub use primitives::{
    datetime_to_unix_seconds, finite_extent, format_time_tick, unix_seconds_to_datetime,
};
pub use scale::{Scale, ScaleKind, ScaleOptions};
pub use time_interval::{TickInterval, TimeInterval, TimeUnit, month_starts, tick_interval};
pub use types::{
    Dataset, GeoPoint, PixelPoint, Record, Viewport, record_measure, record_time,
};
