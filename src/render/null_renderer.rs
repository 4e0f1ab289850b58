use crate::error::AtlasResult;
use crate::render::{AtlasFrame, Renderer};

/// No-op renderer used by tests and headless sessions.
///
/// It still validates frame content so invalid geometry is caught without a
/// drawing backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_bubble_count: usize,
    pub last_bar_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &AtlasFrame) -> AtlasResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_bubble_count = frame.map.bubbles.len();
        self.last_bar_count = frame.histogram.bars.len();
        Ok(())
    }
}
