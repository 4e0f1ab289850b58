use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::GeoPoint;

/// Geographic geometry in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    /// Exterior ring first, then holes. Rings are closed.
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
    GeometryCollection(Vec<Geometry>),
    /// The outline of the whole globe.
    Sphere,
}

impl Geometry {
    /// Number of vertices, ignoring the implicit sphere outline.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Point(_) => 1,
            Self::MultiPoint(points) | Self::LineString(points) => points.len(),
            Self::MultiLineString(lines) | Self::Polygon(lines) => lines.iter().map(Vec::len).sum(),
            Self::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter())
                .map(Vec::len)
                .sum(),
            Self::GeometryCollection(geometries) => {
                geometries.iter().map(Geometry::vertex_count).sum()
            }
            Self::Sphere => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: Option<Value>,
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Static map backdrop shared by every render of one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeographyModel {
    /// Land polygons, one feature per land object geometry.
    pub land: FeatureCollection,
    /// Borders shared by two different countries, as one multi-line.
    pub interiors: Vec<Vec<GeoPoint>>,
}

impl GeographyModel {
    #[must_use]
    pub fn interiors_geometry(&self) -> Geometry {
        Geometry::MultiLineString(self.interiors.clone())
    }
}

/// Finest graticule spacing; smaller steps are raised to this.
pub const MIN_GRATICULE_STEP_DEG: f64 = 1.0;

/// Meridians and parallels every `step_deg` degrees.
///
/// Parallels stop at ±80°; meridians on multiples of 90° run pole to pole.
#[must_use]
pub fn graticule(step_deg: f64) -> Geometry {
    const SAMPLE_DEG: f64 = 2.5;
    let step = if step_deg.is_finite() && step_deg > 0.0 {
        step_deg.max(MIN_GRATICULE_STEP_DEG)
    } else {
        10.0
    };

    let mut lines = Vec::new();
    let meridian_count = (360.0 / step).floor() as i64;
    for i in 0..=meridian_count {
        let lon = -180.0 + i as f64 * step;
        if lon > 180.0 {
            break;
        }
        let polar = lon.rem_euclid(90.0) == 0.0;
        let limit = if polar { 90.0 } else { 80.0 };
        lines.push(sample_line(-limit, limit, SAMPLE_DEG, |lat| GeoPoint::new(lon, lat)));
    }

    let parallel_count = (160.0 / step).floor() as i64;
    for i in 0..=parallel_count {
        let lat = -80.0 + i as f64 * step;
        if lat > 80.0 {
            break;
        }
        lines.push(sample_line(-180.0, 180.0, SAMPLE_DEG, |lon| GeoPoint::new(lon, lat)));
    }

    Geometry::MultiLineString(lines)
}

pub(crate) fn sample_line(
    from: f64,
    to: f64,
    sample: f64,
    point_at: impl Fn(f64) -> GeoPoint,
) -> Vec<GeoPoint> {
    let steps = ((to - from).abs() / sample).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| point_at(from + (to - from) * i as f64 / steps as f64))
        .collect()
}
