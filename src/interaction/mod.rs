//! Brush interaction and the selection it drives.
//!
//! The histogram's [`Brush`] is the only producer of [`SelectionMessage`]s
//! and the [`SelectionStore`] is their only consumer; the filter step reads
//! the store, never the brush.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::Scale;

/// Active time range chosen with the brush.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Selection {
    #[default]
    Unselected,
    /// Exclusive bounds, `low < high`, in record time units.
    Selecting { low: f64, high: f64 },
}

impl Selection {
    /// Builds a selection from two domain values in either order.
    ///
    /// Returns `None` when the bounds are not finite or collapse to a point.
    #[must_use]
    pub fn between(a: f64, b: f64) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        (low < high).then_some(Self::Selecting { low, high })
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Selecting { .. })
    }

    #[must_use]
    pub fn bounds(self) -> Option<(f64, f64)> {
        match self {
            Self::Unselected => None,
            Self::Selecting { low, high } => Some((low, high)),
        }
    }

    /// Strict membership test used by the filter step.
    #[must_use]
    pub fn admits(self, value: f64) -> bool {
        match self {
            Self::Unselected => true,
            Self::Selecting { low, high } => low < value && value < high,
        }
    }
}

/// Horizontal pixel span reported by the brush gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelExtent {
    pub x0: f64,
    pub x1: f64,
}

impl PixelExtent {
    #[must_use]
    pub const fn new(x0: f64, x1: f64) -> Self {
        Self { x0, x1 }
    }

    /// Ordered and clamped to `[lower, upper]`; `None` when not finite.
    #[must_use]
    pub fn clamped(self, lower: f64, upper: f64) -> Option<Self> {
        if !self.x0.is_finite() || !self.x1.is_finite() || lower > upper {
            return None;
        }
        let left = self.x0.min(self.x1).clamp(lower, upper);
        let right = self.x0.max(self.x1).clamp(lower, upper);
        Some(Self::new(left, right))
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.x1 - self.x0).is_normal()
    }
}

/// Raw gesture events delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BrushEvent {
    /// Intermediate drag position; `None` while nothing is spanned yet.
    DragUpdate(Option<PixelExtent>),
    /// Gesture finished; `None` means the brush was cleared.
    DragEnd(Option<PixelExtent>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BrushMode {
    #[default]
    Idle,
    Dragging,
}

/// Message carrying the selection that replaces the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionMessage {
    pub selection: Selection,
}

impl SelectionMessage {
    #[must_use]
    pub const fn new(selection: Selection) -> Self {
        Self { selection }
    }

    #[must_use]
    pub const fn clear() -> Self {
        Self::new(Selection::Unselected)
    }
}

/// Brush state owned by the histogram view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Brush {
    mode: BrushMode,
    extent: Option<PixelExtent>,
}

impl Brush {
    #[must_use]
    pub fn mode(self) -> BrushMode {
        self.mode
    }

    /// Current pixel span, already clamped to the plot width.
    #[must_use]
    pub fn extent(self) -> Option<PixelExtent> {
        self.extent
    }

    /// Feeds one gesture event and returns the message to deliver, if any.
    ///
    /// `x_scale` is the histogram's time scale; its range bounds the
    /// brushable area. Empty spans during a drag are ignored so the map does
    /// not flash back to the unfiltered state mid-gesture.
    pub fn on_event(&mut self, event: BrushEvent, x_scale: Scale) -> Option<SelectionMessage> {
        let (range_start, range_end) = x_scale.range();
        let (lower, upper) = (range_start.min(range_end), range_start.max(range_end));

        match event {
            BrushEvent::DragUpdate(extent) => {
                self.mode = BrushMode::Dragging;
                let extent = extent
                    .and_then(|extent| extent.clamped(lower, upper))
                    .filter(|extent| !extent.is_empty())?;
                self.extent = Some(extent);
                let message = selection_from_extent(extent, x_scale).map(SelectionMessage::new);
                trace!(x0 = extent.x0, x1 = extent.x1, "brush drag update");
                message
            }
            BrushEvent::DragEnd(extent) => {
                self.mode = BrushMode::Idle;
                let extent = extent
                    .and_then(|extent| extent.clamped(lower, upper))
                    .filter(|extent| !extent.is_empty());
                self.extent = extent;
                let selection = extent
                    .and_then(|extent| selection_from_extent(extent, x_scale))
                    .unwrap_or(Selection::Unselected);
                trace!(active = selection.is_active(), "brush drag end");
                Some(SelectionMessage::new(selection))
            }
        }
    }

    /// Drops the visible brush, e.g. after the histogram axis was rebuilt.
    pub fn reset(&mut self) {
        self.mode = BrushMode::Idle;
        self.extent = None;
    }
}

fn selection_from_extent(extent: PixelExtent, x_scale: Scale) -> Option<Selection> {
    Selection::between(x_scale.invert(extent.x0), x_scale.invert(extent.x1))
}

/// Session-scoped cell holding the current [`Selection`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionStore {
    selection: Selection,
    revision: u64,
}

impl SelectionStore {
    #[must_use]
    pub fn selection(self) -> Selection {
        self.selection
    }

    /// Incremented on every change of the stored selection.
    #[must_use]
    pub fn revision(self) -> u64 {
        self.revision
    }

    /// Replaces the stored selection; returns `true` when it changed.
    pub fn apply(&mut self, message: SelectionMessage) -> bool {
        if self.selection == message.selection {
            return false;
        }
        self.selection = message.selection;
        self.revision = self.revision.wrapping_add(1);
        trace!(
            revision = self.revision,
            active = self.selection.is_active(),
            "selection replaced"
        );
        true
    }
}
