use tracing::debug;

use crate::api::config::AtlasStyle;
use crate::api::pipeline::{Backdrop, Pipeline};
use crate::core::{Record, Scale, record_measure};
use crate::render::{CirclePrimitive, MapLayer, PathPrimitive, PathRole};

/// Builds the bubble map from the refreshed pipeline.
///
/// Bubbles whose location cannot be projected or whose radius is not a
/// finite number are left out of the frame; they stay in the filtered set.
pub fn build_map_layer(pipeline: &mut Pipeline, style: &AtlasStyle) -> MapLayer {
    let backdrop = pipeline
        .backdrop()
        .map(|backdrop| backdrop_paths(backdrop, style))
        .unwrap_or_default();

    let (Some(size_scale), Some(filtered)) = (pipeline.size_scale(), pipeline.filtered().cloned())
    else {
        return MapLayer {
            backdrop,
            bubbles: Vec::new(),
        };
    };

    let mut bubbles = Vec::with_capacity(filtered.len());
    let mut skipped = 0usize;
    for record in filtered.iter() {
        match bubble(pipeline, size_scale, record, style) {
            Some(circle) => bubbles.push(circle),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, drawn = bubbles.len(), "undrawable bubbles left out");
    }

    MapLayer { backdrop, bubbles }
}

fn bubble(
    pipeline: &mut Pipeline,
    size_scale: Scale,
    record: &Record,
    style: &AtlasStyle,
) -> Option<CirclePrimitive> {
    let radius = size_scale.map(record_measure(record));
    if !radius.is_finite() || radius < 0.0 {
        return None;
    }
    let center = pipeline.project_record(record)?;
    if !center.x.is_finite() || !center.y.is_finite() {
        return None;
    }
    Some(CirclePrimitive::new(center.x, center.y, radius, style.bubble_fill))
}

fn backdrop_paths(backdrop: &Backdrop, style: &AtlasStyle) -> Vec<PathPrimitive> {
    let mut paths = Vec::with_capacity(backdrop.land.len() + 3);
    paths.push(PathPrimitive {
        role: PathRole::Sphere,
        path: backdrop.sphere.clone(),
        fill: Some(style.sphere_fill),
        stroke: None,
        stroke_width: 0.0,
    });
    paths.push(PathPrimitive {
        role: PathRole::Graticule,
        path: backdrop.graticule.clone(),
        fill: None,
        stroke: Some(style.graticule_stroke),
        stroke_width: 1.0,
    });
    paths.extend(backdrop.land.iter().map(|land| PathPrimitive {
        role: PathRole::Land,
        path: land.clone(),
        fill: Some(style.land_fill),
        stroke: None,
        stroke_width: 0.0,
    }));
    paths.push(PathPrimitive {
        role: PathRole::Interiors,
        path: backdrop.interiors.clone(),
        fill: None,
        stroke: Some(style.interiors_stroke),
        stroke_width: 1.0,
    });
    paths
}
