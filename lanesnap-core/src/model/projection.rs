//! Geographic to planar coordinate conversion seam
//!
//! All geometry runs in planar coordinates where Euclidean distance
//! approximates ground distance. Real geodesy is the caller's
//! concern; the network loader only recovers the translation a SUMO
//! file bakes into its `<location netOffset>` element.

use geo::Point;

/// Two-way conversion between geographic (lon, lat) and planar (x, y)
/// coordinates.
///
/// Points are `(x = lon, y = lat)` on the geographic side.
pub trait PlanarProjection {
    fn to_planar(&self, geo: Point<f64>) -> Point<f64>;
    fn to_geo(&self, planar: Point<f64>) -> Point<f64>;
}

/// Pure translation by the SUMO network offset.
///
/// Matches SUMO's plain projection (`projParameter="!"`), where
/// network coordinates are geographic coordinates shifted by
/// `netOffset`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetOffsetProjection {
    pub dx: f64,
    pub dy: f64,
}

impl NetOffsetProjection {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl PlanarProjection for NetOffsetProjection {
    fn to_planar(&self, geo: Point<f64>) -> Point<f64> {
        Point::new(geo.x() + self.dx, geo.y() + self.dy)
    }

    fn to_geo(&self, planar: Point<f64>) -> Point<f64> {
        Point::new(planar.x() - self.dx, planar.y() - self.dy)
    }
}

/// No-op projection for callers that already work in planar
/// coordinates, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProjection;

impl PlanarProjection for IdentityProjection {
    fn to_planar(&self, geo: Point<f64>) -> Point<f64> {
        geo
    }

    fn to_geo(&self, planar: Point<f64>) -> Point<f64> {
        planar
    }
}
