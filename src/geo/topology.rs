//! TopoJSON decoding for the map backdrop.
//!
//! Only what the backdrop needs is supported: arc-based geometries, the
//! optional quantization transform, `feature` extraction and `mesh` with a
//! pair predicate. Meshed arcs are emitted one line per arc, without
//! stitching.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::GeoPoint;
use crate::error::{AtlasError, AtlasResult};
use crate::geo::geometry::{Feature, FeatureCollection, GeographyModel, Geometry};

pub const LAND_OBJECT: &str = "land";
pub const COUNTRIES_OBJECT: &str = "countries";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopologyTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<TopologyTransform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: IndexMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoGeometry {
    #[serde(flatten)]
    pub shape: TopoShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

/// Arc references: a negative index `i` means arc `!i` walked backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TopoShape {
    GeometryCollection { geometries: Vec<TopoGeometry> },
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
}

impl Topology {
    pub fn from_json_str(input: &str) -> AtlasResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| AtlasError::InvalidTopology(format!("failed to parse topology json: {e}")))
    }

    pub fn object(&self, name: &str) -> AtlasResult<&TopoGeometry> {
        self.objects
            .get(name)
            .ok_or_else(|| AtlasError::InvalidTopology(format!("missing object `{name}`")))
    }

    /// Decodes every arc to absolute coordinates once.
    pub fn decode_arcs(&self) -> AtlasResult<DecodedArcs> {
        let mut decoded = Vec::with_capacity(self.arcs.len());
        for (arc_index, arc) in self.arcs.iter().enumerate() {
            let mut x = 0.0;
            let mut y = 0.0;
            let mut points = Vec::with_capacity(arc.len());
            for position in arc {
                let (Some(&px), Some(&py)) = (position.first(), position.get(1)) else {
                    return Err(AtlasError::InvalidTopology(format!(
                        "arc {arc_index} has a position with fewer than two values"
                    )));
                };
                let point = match self.transform {
                    Some(transform) => {
                        x += px;
                        y += py;
                        GeoPoint::new(
                            x * transform.scale[0] + transform.translate[0],
                            y * transform.scale[1] + transform.translate[1],
                        )
                    }
                    None => GeoPoint::new(px, py),
                };
                points.push(point);
            }
            decoded.push(points);
        }
        Ok(DecodedArcs { arcs: decoded })
    }

    /// Converts an object to features; collections yield one feature per member.
    pub fn feature(&self, object: &TopoGeometry) -> AtlasResult<FeatureCollection> {
        let arcs = self.decode_arcs()?;
        let features = match &object.shape {
            TopoShape::GeometryCollection { geometries } => geometries
                .iter()
                .map(|geometry| to_feature(&arcs, self.transform, geometry))
                .collect::<AtlasResult<Vec<_>>>()?,
            _ => vec![to_feature(&arcs, self.transform, object)?],
        };
        Ok(FeatureCollection { features })
    }

    /// Lines for the arcs of `object` accepted by `filter`.
    ///
    /// `filter` receives the first and last geometry referencing an arc; for
    /// an arc used by a single geometry both arguments are that geometry.
    /// Without a filter every arc is kept.
    pub fn mesh<F>(&self, object: &TopoGeometry, filter: Option<F>) -> AtlasResult<Vec<Vec<GeoPoint>>>
    where
        F: Fn(&TopoGeometry, &TopoGeometry) -> bool,
    {
        let arcs = self.decode_arcs()?;
        let mut users: IndexMap<usize, Vec<(i64, &TopoGeometry)>> = IndexMap::new();
        collect_arc_users(object, &mut users);

        let mut lines = Vec::new();
        let mut ordered: Vec<_> = users.into_iter().collect();
        ordered.sort_by_key(|(arc, _)| *arc);
        for (_, refs) in ordered {
            let (Some(&(first_index, first)), Some(&(_, last))) = (refs.first(), refs.last())
            else {
                continue;
            };
            let keep = filter.as_ref().is_none_or(|filter| filter(first, last));
            if keep {
                lines.push(arcs.line(&[first_index])?);
            }
        }
        Ok(lines)
    }

    /// Borders between two distinct geometries of `object`.
    pub fn interior_mesh(&self, object: &TopoGeometry) -> AtlasResult<Vec<Vec<GeoPoint>>> {
        self.mesh(
            object,
            Some(|a: &TopoGeometry, b: &TopoGeometry| !std::ptr::eq(a, b)),
        )
    }
}

/// Arcs in absolute coordinates, indexable with signed TopoJSON references.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArcs {
    arcs: Vec<Vec<GeoPoint>>,
}

impl DecodedArcs {
    fn arc(&self, index: i64) -> AtlasResult<(&[GeoPoint], bool)> {
        let reversed = index < 0;
        let position = if reversed { !index } else { index };
        usize::try_from(position)
            .ok()
            .and_then(|position| self.arcs.get(position))
            .map(|arc| (arc.as_slice(), reversed))
            .ok_or_else(|| AtlasError::InvalidTopology(format!("arc index {index} out of bounds")))
    }

    /// Concatenates arcs, dropping the shared vertex at each join.
    fn line(&self, indices: &[i64]) -> AtlasResult<Vec<GeoPoint>> {
        let mut points: Vec<GeoPoint> = Vec::new();
        for &index in indices {
            let (arc, reversed) = self.arc(index)?;
            if !points.is_empty() {
                points.pop();
            }
            if reversed {
                points.extend(arc.iter().rev().copied());
            } else {
                points.extend(arc.iter().copied());
            }
        }
        Ok(points)
    }

    fn ring(&self, indices: &[i64]) -> AtlasResult<Vec<GeoPoint>> {
        let mut points = self.line(indices)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points)
    }
}

fn to_feature(
    arcs: &DecodedArcs,
    transform: Option<TopologyTransform>,
    object: &TopoGeometry,
) -> AtlasResult<Feature> {
    Ok(Feature {
        id: object.id.clone(),
        properties: object.properties.clone().unwrap_or_default(),
        geometry: Some(to_geometry(arcs, transform, object)?),
    })
}

fn to_geometry(
    arcs: &DecodedArcs,
    transform: Option<TopologyTransform>,
    object: &TopoGeometry,
) -> AtlasResult<Geometry> {
    let point = |coordinates: &[f64]| -> AtlasResult<GeoPoint> {
        let (Some(&x), Some(&y)) = (coordinates.first(), coordinates.get(1)) else {
            return Err(AtlasError::InvalidTopology(
                "point has fewer than two coordinates".to_owned(),
            ));
        };
        Ok(match transform {
            Some(transform) => GeoPoint::new(
                x * transform.scale[0] + transform.translate[0],
                y * transform.scale[1] + transform.translate[1],
            ),
            None => GeoPoint::new(x, y),
        })
    };
    let rings = |polygon: &[Vec<i64>]| -> AtlasResult<Vec<Vec<GeoPoint>>> {
        polygon.iter().map(|ring| arcs.ring(ring)).collect()
    };

    Ok(match &object.shape {
        TopoShape::GeometryCollection { geometries } => Geometry::GeometryCollection(
            geometries
                .iter()
                .map(|geometry| to_geometry(arcs, transform, geometry))
                .collect::<AtlasResult<Vec<_>>>()?,
        ),
        TopoShape::Point { coordinates } => Geometry::Point(point(coordinates)?),
        TopoShape::MultiPoint { coordinates } => Geometry::MultiPoint(
            coordinates
                .iter()
                .map(|coordinates| point(coordinates))
                .collect::<AtlasResult<Vec<_>>>()?,
        ),
        TopoShape::LineString { arcs: indices } => Geometry::LineString(arcs.line(indices)?),
        TopoShape::MultiLineString { arcs: lines } => Geometry::MultiLineString(
            lines
                .iter()
                .map(|indices| arcs.line(indices))
                .collect::<AtlasResult<Vec<_>>>()?,
        ),
        TopoShape::Polygon { arcs: polygon } => Geometry::Polygon(rings(polygon)?),
        TopoShape::MultiPolygon { arcs: polygons } => Geometry::MultiPolygon(
            polygons
                .iter()
                .map(|polygon| rings(polygon))
                .collect::<AtlasResult<Vec<_>>>()?,
        ),
    })
}

fn collect_arc_users<'a>(
    geometry: &'a TopoGeometry,
    users: &mut IndexMap<usize, Vec<(i64, &'a TopoGeometry)>>,
) {
    if let TopoShape::GeometryCollection { geometries } = &geometry.shape {
        for member in geometries {
            collect_arc_users(member, users);
        }
        return;
    }

    let mut record = |index: i64| {
        let position = if index < 0 { !index } else { index };
        if let Ok(position) = usize::try_from(position) {
            users.entry(position).or_default().push((index, geometry));
        }
    };
    match &geometry.shape {
        TopoShape::GeometryCollection { .. } | TopoShape::Point { .. } | TopoShape::MultiPoint { .. } => {}
        TopoShape::LineString { arcs } => arcs.iter().copied().for_each(&mut record),
        TopoShape::MultiLineString { arcs } | TopoShape::Polygon { arcs } => {
            arcs.iter().flatten().copied().for_each(&mut record)
        }
        TopoShape::MultiPolygon { arcs } => {
            arcs.iter().flatten().flatten().copied().for_each(&mut record)
        }
    }
}

impl GeographyModel {
    /// Land features plus country borders from the default object names.
    pub fn from_topology(topology: &Topology) -> AtlasResult<Self> {
        Self::from_topology_objects(topology, LAND_OBJECT, COUNTRIES_OBJECT)
    }

    pub fn from_topology_objects(
        topology: &Topology,
        land_object: &str,
        countries_object: &str,
    ) -> AtlasResult<Self> {
        let land = topology.feature(topology.object(land_object)?)?;
        let interiors = topology.interior_mesh(topology.object(countries_object)?)?;
        debug!(
            land_features = land.len(),
            interior_lines = interiors.len(),
            "geography model built"
        );
        Ok(Self { land, interiors })
    }
}
