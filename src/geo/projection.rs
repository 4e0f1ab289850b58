use serde::{Deserialize, Serialize};

use crate::core::{GeoPoint, PixelPoint, Viewport};

/// Cartographic projection from degrees to canvas pixels.
///
/// Implementations must be pure: the same input always gives the same
/// output for the lifetime of the value.
pub trait Projection: Send + Sync {
    /// Returns `None` for coordinates the projection cannot place.
    fn project(&self, point: GeoPoint) -> Option<PixelPoint>;
}

/// Pseudo-cylindrical Natural Earth projection (Šavrič et al. polynomial).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaturalEarth1 {
    pub scale: f64,
    pub translate: PixelPoint,
}

impl NaturalEarth1 {
    /// Scale that fits the globe into a 960 px wide canvas.
    pub const REFERENCE_SCALE: f64 = 175.295;
    pub const REFERENCE_WIDTH: f64 = 960.0;

    #[must_use]
    pub const fn new(scale: f64, translate: PixelPoint) -> Self {
        Self { scale, translate }
    }

    /// Centers the globe in `viewport`, sized proportionally to its width.
    #[must_use]
    pub fn for_viewport(viewport: Viewport) -> Self {
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        Self::new(
            Self::REFERENCE_SCALE * width / Self::REFERENCE_WIDTH,
            PixelPoint::new(width / 2.0, height / 2.0),
        )
    }

    /// Unit-sphere projection of radians.
    #[must_use]
    pub fn raw(lambda: f64, phi: f64) -> (f64, f64) {
        let phi2 = phi * phi;
        let phi4 = phi2 * phi2;
        let x = lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
        let y = phi
            * (1.007226 + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
        (x, y)
    }
}

impl Default for NaturalEarth1 {
    fn default() -> Self {
        Self::new(Self::REFERENCE_SCALE, PixelPoint::new(480.0, 250.0))
    }
}

impl Projection for NaturalEarth1 {
    fn project(&self, point: GeoPoint) -> Option<PixelPoint> {
        if !point.is_finite() {
            return None;
        }
        let lon = wrap_longitude(point.lon);
        let lat = point.lat.clamp(-90.0, 90.0);
        let (x, y) = Self::raw(lon.to_radians(), lat.to_radians());
        Some(PixelPoint::new(
            self.translate.x + self.scale * x,
            self.translate.y - self.scale * y,
        ))
    }
}

/// Brings a longitude into `[-180, 180]`, keeping both edges.
#[must_use]
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_translate() {
        let projection = NaturalEarth1::default();
        let pixel = projection
            .project(GeoPoint::new(0.0, 0.0))
            .expect("origin projects");
        assert_eq!(pixel, PixelPoint::new(480.0, 250.0));
    }

    #[test]
    fn north_is_up() {
        let projection = NaturalEarth1::default();
        let north = projection.project(GeoPoint::new(0.0, 45.0)).expect("north");
        assert!(north.y < 250.0);
    }

    #[test]
    fn longitudes_wrap_into_range() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(540.0), 180.0);
    }
}
