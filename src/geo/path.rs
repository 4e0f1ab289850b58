use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PixelPoint;

/// Radius used when a point geometry is drawn as a path.
pub const POINT_RADIUS: f64 = 4.5;

/// Connected run of projected vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubPath {
    pub points: Vec<PixelPoint>,
    pub closed: bool,
}

impl SubPath {
    #[must_use]
    pub fn open(points: Vec<PixelPoint>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    #[must_use]
    pub fn closed(points: Vec<PixelPoint>) -> Self {
        Self {
            points,
            closed: true,
        }
    }
}

/// Projected geometry, ready for a renderer.
///
/// Single-vertex open sub-paths stand for point geometries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPath {
    subpaths: SmallVec<[SubPath; 4]>,
}

impl GeoPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subpath: SubPath) {
        if !subpath.points.is_empty() {
            self.subpaths.push(subpath);
        }
    }

    pub fn extend(&mut self, other: GeoPath) {
        self.subpaths.extend(other.subpaths);
    }

    #[must_use]
    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.subpaths.iter().map(|subpath| subpath.points.len()).sum()
    }

    /// SVG `d` attribute, coordinates rounded to three decimals.
    #[must_use]
    pub fn to_svg_path_data(&self) -> String {
        let mut data = String::new();
        for subpath in &self.subpaths {
            match subpath.points.as_slice() {
                [] => {}
                [point] if !subpath.closed => {
                    let r = POINT_RADIUS;
                    let _ = write!(
                        data,
                        "M{},{}m0,{}a{r},{r} 0 1,1 0,{}a{r},{r} 0 1,1 0,{}z",
                        fmt_coord(point.x),
                        fmt_coord(point.y),
                        fmt_coord(r),
                        fmt_coord(-2.0 * r),
                        fmt_coord(2.0 * r),
                    );
                }
                [first, rest @ ..] => {
                    let _ = write!(data, "M{},{}", fmt_coord(first.x), fmt_coord(first.y));
                    for point in rest {
                        let _ = write!(data, "L{},{}", fmt_coord(point.x), fmt_coord(point.y));
                    }
                    if subpath.closed {
                        data.push('Z');
                    }
                }
            }
        }
        data
    }
}

fn fmt_coord(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}
