mod frame;
mod null_renderer;
mod primitives;
mod svg_backend;

pub use frame::{AtlasFrame, HistogramLayer, MapLayer};
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, PathPrimitive, PathRole, RectPrimitive, TextHAlign,
    TextPrimitive,
};
pub use svg_backend::{SvgRenderStats, SvgRenderer};

use crate::error::AtlasResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `AtlasFrame` so drawing code stays
/// isolated from scale, binning and selection logic.
pub trait Renderer {
    fn render(&mut self, frame: &AtlasFrame) -> AtlasResult<()>;
}
