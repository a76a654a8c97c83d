//! Network components - edges and their polyline shapes

use geo::{Coord, LineString};

use crate::EdgeId;

/// A drivable edge of the road network
///
/// Immutable after network construction. The shape is ordered from
/// edge start to edge end; `length` caches the sum of the segment
/// lengths.
#[derive(Debug, Clone)]
pub struct Edge {
    /// SUMO edge id, unique within a network
    pub id: EdgeId,
    /// Polyline in planar coordinates
    pub shape: LineString<f64>,
    /// Total polyline length
    pub length: f64,
}

impl Edge {
    pub fn new(id: EdgeId, shape: LineString<f64>) -> Self {
        let length = polyline_length(&shape);
        Self { id, shape, length }
    }
}

pub(crate) fn polyline_length(shape: &LineString<f64>) -> f64 {
    shape
        .lines()
        .map(|segment| segment_length(segment.start, segment.end))
        .sum()
}

pub(crate) fn segment_length(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::line_string;

    use super::*;

    #[test]
    fn length_sums_consecutive_segments() {
        let edge = Edge::new(
            "E1".into(),
            line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 3.0, y: 14.0)],
        );
        assert_relative_eq!(edge.length, 15.0);
    }

    #[test]
    fn single_segment_length() {
        let edge = Edge::new("E1".into(), line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]);
        assert_relative_eq!(edge.length, 10.0);
    }
}
