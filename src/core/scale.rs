use serde::{Deserialize, Serialize};

use crate::core::ticks::{DEFAULT_TICK_COUNT, linear_ticks, nice_linear_domain};
use crate::core::time_interval::{TickInterval, tick_interval};
use crate::error::{AtlasError, AtlasResult};

/// Mapping family used by [`Scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScaleKind {
    /// Uniform spacing in raw domain units.
    #[default]
    Linear,
    /// Uniform spacing in `sign(x) * sqrt(|x|)`, so areas grow linearly.
    Sqrt,
    /// Linear over UTC unix seconds with calendar-aware ticks and `nice`.
    Time,
}

/// Construction switches for [`Scale::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScaleOptions {
    /// Round the domain outward to tick boundaries before any mapping.
    pub nice: bool,
    /// Clamp `map` output to the range and `invert` output to the domain.
    pub clamp: bool,
}

impl ScaleOptions {
    #[must_use]
    pub const fn niced() -> Self {
        Self {
            nice: true,
            clamp: false,
        }
    }

    #[must_use]
    pub const fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }
}

/// Continuous mapping from a data domain to a pixel range.
///
/// A scale is immutable: rebuilding is how a new domain or range takes
/// effect. The `domain` stored here is the effective one, i.e. after `nice`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    kind: ScaleKind,
    domain_low: f64,
    domain_high: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
}

impl Scale {
    pub fn build(
        kind: ScaleKind,
        domain: (f64, f64),
        range: (f64, f64),
        options: ScaleOptions,
    ) -> AtlasResult<Self> {
        let (low, high) = domain;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(AtlasError::InvalidDomain { low, high });
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(AtlasError::InvalidRange {
                start: range.0,
                end: range.1,
            });
        }

        let (domain_low, domain_high) = if options.nice {
            nice_domain(kind, low, high)
        } else {
            (low, high)
        };

        Ok(Self {
            kind,
            domain_low,
            domain_high,
            range_start: range.0,
            range_end: range.1,
            clamp: options.clamp,
        })
    }

    pub fn linear(domain: (f64, f64), range: (f64, f64)) -> AtlasResult<Self> {
        Self::build(ScaleKind::Linear, domain, range, ScaleOptions::default())
    }

    pub fn sqrt(domain: (f64, f64), range: (f64, f64)) -> AtlasResult<Self> {
        Self::build(ScaleKind::Sqrt, domain, range, ScaleOptions::default())
    }

    pub fn time(domain: (f64, f64), range: (f64, f64)) -> AtlasResult<Self> {
        Self::build(ScaleKind::Time, domain, range, ScaleOptions::default())
    }

    #[must_use]
    pub fn kind(self) -> ScaleKind {
        self.kind
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_low, self.domain_high)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.domain_low == self.domain_high
    }

    /// Maps a domain value to a pixel coordinate.
    ///
    /// A degenerate domain maps every value to the middle of the range.
    /// Non-finite input yields `NaN`.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        if !value.is_finite() {
            return f64::NAN;
        }
        if self.is_degenerate() {
            return (self.range_start + self.range_end) * 0.5;
        }

        let low = self.transform(self.domain_low);
        let high = self.transform(self.domain_high);
        let mut normalized = (self.transform(value) - low) / (high - low);
        if self.clamp {
            normalized = normalized.clamp(0.0, 1.0);
        }
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Maps a pixel coordinate back to the domain.
    ///
    /// Returns the domain value itself when the domain is degenerate and
    /// `NaN` when the range is zero-width.
    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        if !pixel.is_finite() {
            return f64::NAN;
        }
        if self.is_degenerate() {
            return self.domain_low;
        }
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return f64::NAN;
        }

        let mut normalized = (pixel - self.range_start) / span;
        if self.clamp {
            normalized = normalized.clamp(0.0, 1.0);
        }
        let low = self.transform(self.domain_low);
        let high = self.transform(self.domain_high);
        self.untransform(low + normalized * (high - low))
    }

    /// Representative domain values, recomputed on every call.
    ///
    /// `count` is a hint; `None` uses ten.
    #[must_use]
    pub fn ticks(self, count: Option<usize>) -> Vec<f64> {
        let count = count.unwrap_or(DEFAULT_TICK_COUNT);
        if count == 0 {
            return Vec::new();
        }
        match self.kind {
            ScaleKind::Linear | ScaleKind::Sqrt => {
                linear_ticks(self.domain_low, self.domain_high, count)
            }
            ScaleKind::Time => time_ticks(self.domain_low, self.domain_high, count),
        }
    }

    fn transform(self, value: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear | ScaleKind::Time => value,
            ScaleKind::Sqrt => value.signum() * value.abs().sqrt(),
        }
    }

    fn untransform(self, value: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear | ScaleKind::Time => value,
            ScaleKind::Sqrt => value.signum() * value * value,
        }
    }
}

fn nice_domain(kind: ScaleKind, low: f64, high: f64) -> (f64, f64) {
    match kind {
        ScaleKind::Linear | ScaleKind::Sqrt => nice_linear_domain(low, high, DEFAULT_TICK_COUNT),
        ScaleKind::Time => match tick_interval(low, high, DEFAULT_TICK_COUNT) {
            TickInterval::Calendar(interval) => {
                match (interval.floor(low), interval.ceil(high)) {
                    (Some(nice_low), Some(nice_high)) => (nice_low, nice_high),
                    _ => (low, high),
                }
            }
            TickInterval::SubSecond => nice_linear_domain(low, high, DEFAULT_TICK_COUNT),
        },
    }
}

fn time_ticks(low: f64, high: f64, count: usize) -> Vec<f64> {
    if low == high {
        return vec![low];
    }
    match tick_interval(low, high, count) {
        TickInterval::Calendar(interval) => {
            let mut ticks = interval.range(low, high);
            if interval.floor(high) == Some(high) {
                ticks.push(high);
            }
            ticks
        }
        TickInterval::SubSecond => linear_ticks(low, high, count),
    }
}
