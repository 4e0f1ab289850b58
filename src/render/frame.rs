use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{AtlasError, AtlasResult};
use crate::render::{CirclePrimitive, LinePrimitive, PathPrimitive, RectPrimitive, TextPrimitive};

/// Bubble map: static backdrop plus one circle per visible record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapLayer {
    pub backdrop: Vec<PathPrimitive>,
    pub bubbles: Vec<CirclePrimitive>,
}

/// Date histogram docked at the bottom of the canvas.
///
/// All coordinates are in canvas pixels, already offset by the layer origin
/// and margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramLayer {
    pub background: RectPrimitive,
    pub bars: Vec<RectPrimitive>,
    pub grid_lines: Vec<LinePrimitive>,
    pub labels: Vec<TextPrimitive>,
    /// Visible brush rectangle, when a span is selected.
    pub brush: Option<RectPrimitive>,
}

/// Backend-agnostic scene for one draw pass of both views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasFrame {
    pub viewport: Viewport,
    pub map: MapLayer,
    pub histogram: HistogramLayer,
}

impl AtlasFrame {
    pub fn validate(&self) -> AtlasResult<()> {
        if !self.viewport.is_valid() {
            return Err(AtlasError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for path in &self.map.backdrop {
            path.validate()?;
        }
        for bubble in &self.map.bubbles {
            bubble.validate()?;
        }

        let histogram = &self.histogram;
        histogram.background.validate()?;
        for bar in &histogram.bars {
            bar.validate()?;
        }
        for line in &histogram.grid_lines {
            line.validate()?;
        }
        for label in &histogram.labels {
            label.validate()?;
        }
        if let Some(brush) = &histogram.brush {
            brush.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.map.backdrop.len()
            + self.map.bubbles.len()
            + 1
            + self.histogram.bars.len()
            + self.histogram.grid_lines.len()
            + self.histogram.labels.len()
            + usize::from(self.histogram.brush.is_some())
    }
}
