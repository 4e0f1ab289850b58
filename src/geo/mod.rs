//! Map backdrop: TopoJSON decoding, projection and path building.

pub mod geometry;
pub mod path;
pub mod projection;
pub mod projector;
pub mod topology;

pub use geometry::{
    Feature, FeatureCollection, GeographyModel, Geometry, MIN_GRATICULE_STEP_DEG, graticule,
};
pub use path::{GeoPath, POINT_RADIUS, SubPath};
pub use projection::{NaturalEarth1, Projection, wrap_longitude};
pub use projector::GeoProjector;
pub use topology::{
    COUNTRIES_OBJECT, DecodedArcs, LAND_OBJECT, TopoGeometry, TopoShape, Topology,
    TopologyTransform,
};
