//! Closest point on a polyline with cumulative arc length

use geo::{Coord, Point};

use crate::model::Edge;
use crate::model::components::segment_length;

/// Relative tolerance for distance ties between segments. Keeps
/// segment-boundary ties deterministic across platforms.
const REL_EPSILON: f64 = 1e-9;

/// Projects a planar point onto an edge polyline.
///
/// Returns `(longitudinal_offset, lateral_distance)`: the arc length
/// from the edge start to the perpendicular foot, and the planar
/// distance from the point to that foot. The offset is bounded by
/// `[0, edge.length]`; ties between segments go to the lower segment
/// index, which favors the match closer to the edge start.
pub fn project(edge: &Edge, point: Point<f64>) -> (f64, f64) {
    let mut best_distance = f64::INFINITY;
    let mut best_offset = 0.0;
    let mut walked = 0.0;

    for segment in edge.shape.lines() {
        let seg_length = segment_length(segment.start, segment.end);
        if seg_length > 0.0 {
            let t = (dot(
                point.0 - segment.start,
                segment.end - segment.start,
            ) / (seg_length * seg_length))
                .clamp(0.0, 1.0);
            let foot = Coord {
                x: segment.start.x + t * (segment.end.x - segment.start.x),
                y: segment.start.y + t * (segment.end.y - segment.start.y),
            };
            let distance = (point.x() - foot.x).hypot(point.y() - foot.y);
            // Strictly-better only, so a tie stays with the earlier
            // segment. The margin is added on the candidate side to
            // keep the comparison finite against the initial infinity.
            if distance + REL_EPSILON * distance.max(1.0) < best_distance {
                best_distance = distance;
                best_offset = walked + t * seg_length;
            }
        }
        walked += seg_length;
    }

    (best_offset.min(edge.length), best_distance)
}

fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}
