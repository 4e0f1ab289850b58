use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{AtlasError, AtlasResult};
use crate::geo::MIN_GRATICULE_STEP_DEG;
use crate::render::Color;
use crate::source::{MalformedRowPolicy, RowMapping};

/// Histogram margins inside its strip, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for HistogramMargins {
    fn default() -> Self {
        Self {
            top: 2.0,
            right: 30.0,
            bottom: 20.0,
            left: 45.0,
        }
    }
}

/// Colors for both views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasStyle {
    pub sphere_fill: Color,
    pub graticule_stroke: Color,
    pub land_fill: Color,
    pub interiors_stroke: Color,
    pub bubble_fill: Color,
    pub histogram_background: Color,
    pub bar_fill: Color,
    pub axis_color: Color,
    pub brush_fill: Color,
    pub axis_font_size_px: f64,
}

impl Default for AtlasStyle {
    fn default() -> Self {
        Self {
            sphere_fill: Color::from_hex(0x2c001e),
            graticule_stroke: Color::from_hex(0x5e2750),
            land_fill: Color::from_hex(0x5e2750),
            interiors_stroke: Color::from_hex(0x2c001e),
            bubble_fill: Color::from_hex(0xe95420).with_alpha(0.3),
            histogram_background: Color::from_hex(0x2c001e),
            bar_fill: Color::from_hex(0xe95420),
            axis_color: Color::from_hex(0xaea79f),
            brush_fill: Color::from_hex(0x777777).with_alpha(0.3),
            axis_font_size_px: 10.0,
        }
    }
}

/// Session configuration.
///
/// Serializable so hosts can keep the layout and source setup in a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasConfig {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    /// Share of the canvas height given to the histogram strip.
    #[serde(default = "default_histogram_height_ratio")]
    pub histogram_height_ratio: f64,
    #[serde(default)]
    pub histogram_margins: HistogramMargins,
    #[serde(default = "default_max_bubble_radius")]
    pub max_bubble_radius: f64,
    #[serde(default = "default_graticule_step_deg")]
    pub graticule_step_deg: f64,
    /// strftime pattern for histogram axis labels.
    #[serde(default = "default_time_tick_format")]
    pub time_tick_format: String,
    #[serde(default)]
    pub row_mapping: RowMapping,
    #[serde(default)]
    pub malformed_rows: MalformedRowPolicy,
    #[serde(default)]
    pub style: AtlasStyle,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
            histogram_height_ratio: default_histogram_height_ratio(),
            histogram_margins: HistogramMargins::default(),
            max_bubble_radius: default_max_bubble_radius(),
            graticule_step_deg: default_graticule_step_deg(),
            time_tick_format: default_time_tick_format(),
            row_mapping: RowMapping::default(),
            malformed_rows: MalformedRowPolicy::default(),
            style: AtlasStyle::default(),
        }
    }
}

impl AtlasConfig {
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    #[must_use]
    pub fn with_max_bubble_radius(mut self, radius: f64) -> Self {
        self.max_bubble_radius = radius;
        self
    }

    #[must_use]
    pub fn with_malformed_rows(mut self, policy: MalformedRowPolicy) -> Self {
        self.malformed_rows = policy;
        self
    }

    pub fn from_json_str(input: &str) -> AtlasResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| AtlasError::InvalidConfig(format!("failed to parse config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> AtlasResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AtlasError::InvalidConfig(format!("failed to serialize config: {e}")))
    }

    pub fn validate(&self) -> AtlasResult<()> {
        if !self.viewport.is_valid() {
            return Err(AtlasError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        let ratio = self.histogram_height_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(AtlasError::InvalidConfig(format!(
                "histogram height ratio must be in (0, 1), got {ratio}"
            )));
        }
        let margins = self.histogram_margins;
        if [margins.top, margins.right, margins.bottom, margins.left]
            .iter()
            .any(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(AtlasError::InvalidConfig(
                "histogram margins must be finite and >= 0".to_owned(),
            ));
        }
        let histogram_height = f64::from(self.viewport.height) * ratio;
        if f64::from(self.viewport.width) - margins.left - margins.right <= 0.0
            || histogram_height - margins.top - margins.bottom <= 0.0
        {
            return Err(AtlasError::InvalidConfig(
                "histogram margins leave no room for the plot".to_owned(),
            ));
        }
        if !self.max_bubble_radius.is_finite() || self.max_bubble_radius < 0.0 {
            return Err(AtlasError::InvalidConfig(
                "max bubble radius must be finite and >= 0".to_owned(),
            ));
        }
        if !self.graticule_step_deg.is_finite()
            || self.graticule_step_deg < MIN_GRATICULE_STEP_DEG
        {
            return Err(AtlasError::InvalidConfig(format!(
                "graticule step must be finite and >= {MIN_GRATICULE_STEP_DEG}"
            )));
        }
        if StrftimeItems::new(&self.time_tick_format).any(|item| matches!(item, Item::Error)) {
            return Err(AtlasError::InvalidConfig(format!(
                "invalid time tick format `{}`",
                self.time_tick_format
            )));
        }
        let style = self.style;
        for color in [
            style.sphere_fill,
            style.graticule_stroke,
            style.land_fill,
            style.interiors_stroke,
            style.bubble_fill,
            style.histogram_background,
            style.bar_fill,
            style.axis_color,
            style.brush_fill,
        ] {
            color.validate().map_err(|e| AtlasError::InvalidConfig(e.to_string()))?;
        }
        if !style.axis_font_size_px.is_finite() || style.axis_font_size_px <= 0.0 {
            return Err(AtlasError::InvalidConfig(
                "axis font size must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(960, 500)
}

fn default_histogram_height_ratio() -> f64 {
    0.15
}

fn default_max_bubble_radius() -> f64 {
    15.0
}

fn default_graticule_step_deg() -> f64 {
    10.0
}

fn default_time_tick_format() -> String {
    "%m/%d/%Y".to_owned()
}

