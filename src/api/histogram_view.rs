use crate::api::config::AtlasStyle;
use crate::api::pipeline::AtlasLayout;
use crate::core::{Bin, Scale, format_time_tick};
use crate::interaction::PixelExtent;
use crate::render::{HistogramLayer, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

pub const X_AXIS_LABEL: &str = "Time";
const X_TICK_OFFSET: f64 = 5.0;
const Y_TICK_OFFSET: f64 = 5.0;
const X_AXIS_LABEL_OFFSET: f64 = 54.0;
const Y_AXIS_LABEL_OFFSET: f64 = 30.0;

/// Scales and bins feeding one histogram draw.
#[derive(Debug, Clone, Copy)]
pub struct HistogramInputs<'a> {
    pub layout: AtlasLayout,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub bins: &'a [Bin],
    pub brush: Option<PixelExtent>,
    pub tick_format: &'a str,
    pub y_axis_label: &'a str,
}

/// Builds the histogram strip in canvas coordinates.
#[must_use]
pub fn build_histogram_layer(inputs: &HistogramInputs<'_>, style: &AtlasStyle) -> HistogramLayer {
    let layout = inputs.layout;
    let origin = layout.plot_origin();
    let font = style.axis_font_size_px;

    let background = RectPrimitive::new(
        0.0,
        layout.histogram_top,
        f64::from(layout.viewport.width),
        layout.histogram_height,
        style.histogram_background,
    );

    let mut grid_lines = Vec::new();
    let mut labels = Vec::new();

    for tick in inputs.x_scale.ticks(None) {
        let x = origin.x + inputs.x_scale.map(tick);
        grid_lines.push(LinePrimitive::new(
            x,
            origin.y,
            x,
            origin.y + layout.inner_height,
            1.0,
            style.axis_color,
        ));
        let text = format_time_tick(tick, inputs.tick_format);
        if !text.is_empty() {
            labels.push(TextPrimitive::new(
                text,
                x,
                origin.y + layout.inner_height + X_TICK_OFFSET + 0.71 * font,
                font,
                style.axis_color,
                TextHAlign::Center,
            ));
        }
    }

    for tick in inputs.y_scale.ticks(None) {
        let y = origin.y + inputs.y_scale.map(tick);
        grid_lines.push(LinePrimitive::new(
            origin.x,
            y,
            origin.x + layout.inner_width,
            y,
            1.0,
            style.axis_color,
        ));
        labels.push(TextPrimitive::new(
            format!("{tick}"),
            origin.x - Y_TICK_OFFSET,
            y + 0.32 * font,
            font,
            style.axis_color,
            TextHAlign::Right,
        ));
    }

    if !inputs.y_axis_label.is_empty() {
        labels.push(
            TextPrimitive::new(
                inputs.y_axis_label,
                origin.x - Y_AXIS_LABEL_OFFSET,
                origin.y + layout.inner_height / 2.0,
                font,
                style.axis_color,
                TextHAlign::Center,
            )
            .rotated(-90.0),
        );
    }
    labels.push(TextPrimitive::new(
        X_AXIS_LABEL,
        origin.x + layout.inner_width / 2.0,
        origin.y + layout.inner_height + X_AXIS_LABEL_OFFSET,
        font,
        style.axis_color,
        TextHAlign::Center,
    ));

    let bars = inputs
        .bins
        .iter()
        .map(|bin| {
            let x0 = inputs.x_scale.map(bin.start);
            let x1 = inputs.x_scale.map(bin.end);
            let y = inputs.y_scale.map(bin.sum);
            RectPrimitive::new(
                origin.x + x0,
                origin.y + y,
                (x1 - x0).max(0.0),
                (layout.inner_height - y).max(0.0),
                style.bar_fill,
            )
            .with_title(format!("{}", bin.sum))
        })
        .collect();

    let brush = inputs.brush.map(|extent| {
        RectPrimitive::new(
            origin.x + extent.x0,
            origin.y,
            extent.x1 - extent.x0,
            layout.inner_height,
            style.brush_fill,
        )
    });

    HistogramLayer {
        background,
        bars,
        grid_lines,
        labels,
        brush,
    }
}
