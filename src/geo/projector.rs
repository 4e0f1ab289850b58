use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::core::{GeoPoint, PixelPoint, Viewport};
use crate::geo::geometry::{Geometry, sample_line};
use crate::geo::path::{GeoPath, SubPath};
use crate::geo::projection::{NaturalEarth1, Projection};

type PointKey = (OrderedFloat<f64>, OrderedFloat<f64>);

const SPHERE_SAMPLE_DEG: f64 = 2.5;

/// Projects records and backdrop geometry, memoizing point projections.
///
/// The memo lives until [`GeoProjector::reset_for_geography`] or a projection
/// change; a session resets it whenever a new topology is loaded.
#[derive(Clone)]
pub struct GeoProjector {
    projection: Arc<dyn Projection>,
    memo: HashMap<PointKey, Option<PixelPoint>>,
}

impl fmt::Debug for GeoProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoProjector")
            .field("memoized_points", &self.memo.len())
            .finish_non_exhaustive()
    }
}

impl Default for GeoProjector {
    fn default() -> Self {
        Self::new(Arc::new(NaturalEarth1::default()))
    }
}

impl GeoProjector {
    #[must_use]
    pub fn new(projection: Arc<dyn Projection>) -> Self {
        Self {
            projection,
            memo: HashMap::new(),
        }
    }

    /// Natural Earth fitted to `viewport`.
    #[must_use]
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self::new(Arc::new(NaturalEarth1::for_viewport(viewport)))
    }

    pub fn set_projection(&mut self, projection: Arc<dyn Projection>) {
        self.projection = projection;
        self.memo.clear();
    }

    /// Clears memoized points; call when the backdrop geography changes.
    pub fn reset_for_geography(&mut self) {
        trace!(cleared = self.memo.len(), "projector memo reset");
        self.memo.clear();
    }

    #[must_use]
    pub fn memoized_points(&self) -> usize {
        self.memo.len()
    }

    pub fn project(&mut self, point: GeoPoint) -> Option<PixelPoint> {
        let key = (OrderedFloat(point.lon), OrderedFloat(point.lat));
        let projection = &self.projection;
        *self
            .memo
            .entry(key)
            .or_insert_with(|| projection.project(point))
    }

    /// Projects a geometry into drawable sub-paths.
    ///
    /// Lines and rings are broken where consecutive vertices are more than
    /// 180° of longitude apart, and where a vertex cannot be projected.
    pub fn path_of(&mut self, geometry: &Geometry) -> GeoPath {
        let mut path = GeoPath::new();
        self.append_geometry(geometry, &mut path);
        path
    }

    fn append_geometry(&mut self, geometry: &Geometry, path: &mut GeoPath) {
        match geometry {
            Geometry::Point(point) => {
                if let Some(pixel) = self.project(*point) {
                    path.push(SubPath::open(vec![pixel]));
                }
            }
            Geometry::MultiPoint(points) => {
                for point in points {
                    self.append_geometry(&Geometry::Point(*point), path);
                }
            }
            Geometry::LineString(line) => self.append_line(line, false, path),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.append_line(line, false, path);
                }
            }
            Geometry::Polygon(rings) => {
                for ring in rings {
                    self.append_line(ring, true, path);
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for ring in polygons.iter().flatten() {
                    self.append_line(ring, true, path);
                }
            }
            Geometry::GeometryCollection(geometries) => {
                for geometry in geometries {
                    self.append_geometry(geometry, path);
                }
            }
            Geometry::Sphere => {
                let outline = self.sphere_outline();
                path.push(SubPath::closed(outline));
            }
        }
    }

    fn append_line(&mut self, line: &[GeoPoint], ring: bool, path: &mut GeoPath) {
        let mut pieces: Vec<Vec<PixelPoint>> = Vec::new();
        let mut current: Vec<PixelPoint> = Vec::new();
        let mut previous: Option<GeoPoint> = None;

        for &point in line {
            let crosses = previous.is_some_and(|prev| (point.lon - prev.lon).abs() > 180.0);
            if crosses && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            match self.project(point) {
                Some(pixel) => current.push(pixel),
                None => {
                    if !current.is_empty() {
                        pieces.push(std::mem::take(&mut current));
                    }
                }
            }
            previous = Some(point);
        }
        if !current.is_empty() {
            pieces.push(current);
        }

        let split = pieces.len() > 1;
        for piece in pieces {
            if ring && !split {
                path.push(SubPath::closed(piece));
            } else {
                path.push(SubPath::open(piece));
            }
        }
    }

    fn sphere_outline(&mut self) -> Vec<PixelPoint> {
        let west = sample_line(-90.0, 90.0, SPHERE_SAMPLE_DEG, |lat| GeoPoint::new(-180.0, lat));
        let east = sample_line(90.0, -90.0, SPHERE_SAMPLE_DEG, |lat| GeoPoint::new(180.0, lat));
        west.into_iter()
            .chain(east)
            .filter_map(|point| self.project(point))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_memoizes_each_point_once() {
        let mut projector = GeoProjector::default();
        let point = GeoPoint::new(12.5, 41.9);
        let first = projector.project(point);
        let second = projector.project(point);
        assert_eq!(first, second);
        assert_eq!(projector.memoized_points(), 1);

        projector.reset_for_geography();
        assert_eq!(projector.memoized_points(), 0);
    }

    #[test]
    fn antimeridian_crossing_splits_line() {
        let mut projector = GeoProjector::default();
        let line = Geometry::LineString(vec![
            GeoPoint::new(170.0, 0.0),
            GeoPoint::new(179.0, 0.0),
            GeoPoint::new(-179.0, 0.0),
            GeoPoint::new(-170.0, 0.0),
        ]);
        let path = projector.path_of(&line);
        assert_eq!(path.subpaths().len(), 2);
        assert_eq!(path.vertex_count(), 4);
    }

    #[test]
    fn sphere_is_one_closed_ring() {
        let mut projector = GeoProjector::default();
        let path = projector.path_of(&Geometry::Sphere);
        assert_eq!(path.subpaths().len(), 1);
        assert!(path.subpaths()[0].closed);
    }
}
