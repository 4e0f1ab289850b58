use std::fmt::Write as _;

use crate::error::{AtlasError, AtlasResult};
use crate::render::{
    AtlasFrame, CirclePrimitive, Color, LinePrimitive, PathPrimitive, RectPrimitive, Renderer,
    TextHAlign, TextPrimitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SvgRenderStats {
    pub paths_drawn: usize,
    pub circles_drawn: usize,
    pub rects_drawn: usize,
    pub lines_drawn: usize,
    pub texts_drawn: usize,
}

/// Renderer that serializes each frame as a standalone SVG document.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    document: String,
    last_stats: SvgRenderStats,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// SVG text of the last rendered frame.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> String {
        self.document
    }

    #[must_use]
    pub fn last_stats(&self) -> SvgRenderStats {
        self.last_stats
    }

    fn write_frame(&mut self, frame: &AtlasFrame) -> std::fmt::Result {
        let mut out = String::new();
        let mut stats = SvgRenderStats::default();
        let (width, height) = (frame.viewport.width, frame.viewport.height);

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;

        writeln!(out, r#"<g class="marks">"#)?;
        for path in &frame.map.backdrop {
            write_path(&mut out, path)?;
            stats.paths_drawn += 1;
        }
        for bubble in &frame.map.bubbles {
            write_circle(&mut out, bubble)?;
            stats.circles_drawn += 1;
        }
        writeln!(out, "</g>")?;

        let histogram = &frame.histogram;
        writeln!(out, r#"<g class="histogram">"#)?;
        write_rect(&mut out, &histogram.background, None)?;
        stats.rects_drawn += 1;
        for line in &histogram.grid_lines {
            write_line(&mut out, line)?;
            stats.lines_drawn += 1;
        }
        for label in &histogram.labels {
            write_text(&mut out, label)?;
            stats.texts_drawn += 1;
        }
        for bar in &histogram.bars {
            write_rect(&mut out, bar, Some("mark"))?;
            stats.rects_drawn += 1;
        }
        if let Some(brush) = &histogram.brush {
            write_rect(&mut out, brush, Some("selection"))?;
            stats.rects_drawn += 1;
        }
        writeln!(out, "</g>")?;
        writeln!(out, "</svg>")?;

        self.document = out;
        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &AtlasFrame) -> AtlasResult<()> {
        frame.validate()?;
        self.write_frame(frame)
            .map_err(|err| AtlasError::InvalidData(format!("failed to write svg: {err}")))
    }
}

fn write_paint(out: &mut String, attribute: &str, color: Option<Color>) -> std::fmt::Result {
    match color {
        Some(color) if color.alpha < 1.0 => write!(
            out,
            r#" {attribute}="{}" {attribute}-opacity="{}""#,
            color.to_hex_string(),
            color.alpha
        ),
        Some(color) => write!(out, r#" {attribute}="{}""#, color.to_hex_string()),
        None => write!(out, r#" {attribute}="none""#),
    }
}

fn write_path(out: &mut String, path: &PathPrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<path class="{}" d="{}""#,
        path.role.class_name(),
        path.path.to_svg_path_data()
    )?;
    write_paint(out, "fill", path.fill)?;
    write_paint(out, "stroke", path.stroke)?;
    if path.stroke.is_some() {
        write!(out, r#" stroke-width="{}""#, path.stroke_width)?;
    }
    writeln!(out, "/>")
}

fn write_circle(out: &mut String, circle: &CirclePrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<circle cx="{}" cy="{}" r="{}""#,
        circle.cx, circle.cy, circle.radius
    )?;
    write_paint(out, "fill", Some(circle.fill))?;
    writeln!(out, "/>")
}

fn write_rect(out: &mut String, rect: &RectPrimitive, class: Option<&str>) -> std::fmt::Result {
    write!(out, "<rect")?;
    if let Some(class) = class {
        write!(out, r#" class="{class}""#)?;
    }
    write!(
        out,
        r#" x="{}" y="{}" width="{}" height="{}""#,
        rect.x, rect.y, rect.width, rect.height
    )?;
    write_paint(out, "fill", Some(rect.fill))?;
    match &rect.title {
        Some(title) => writeln!(out, "><title>{}</title></rect>", escape_text(title)),
        None => writeln!(out, "/>"),
    }
}

fn write_line(out: &mut String, line: &LinePrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{}""#,
        line.x1, line.y1, line.x2, line.y2, line.stroke_width
    )?;
    write_paint(out, "stroke", Some(line.color))?;
    writeln!(out, "/>")
}

fn write_text(out: &mut String, text: &TextPrimitive) -> std::fmt::Result {
    let anchor = match text.h_align {
        TextHAlign::Left => "start",
        TextHAlign::Center => "middle",
        TextHAlign::Right => "end",
    };
    write!(
        out,
        r#"<text x="{}" y="{}" font-size="{}" text-anchor="{anchor}""#,
        text.x, text.y, text.font_size_px
    )?;
    if text.rotation_deg != 0.0 {
        write!(
            out,
            r#" transform="rotate({} {} {})""#,
            text.rotation_deg, text.x, text.y
        )?;
    }
    write_paint(out, "fill", Some(text.color))?;
    writeln!(out, ">{}</text>", escape_text(&text.text))
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
