//! Snapping queries against the road network
//!
//! [`project`] finds the closest point on a single edge polyline,
//! [`locate`] ranks nearby edges for a query point with a two-tier
//! search radius.

mod locator;
mod projector;

pub use locator::{EdgeMatch, locate, locate_best};
pub use projector::project;

use serde::{Deserialize, Serialize};

use crate::EdgeId;

/// Tuning knobs for the snapping pipeline.
///
/// The defaults are in network length-units (meters for a metric
/// SUMO net).
#[derive(Debug, Clone)]
pub struct SnapConfig {
    /// First search radius around the query point
    pub initial_radius: f64,
    /// Fallback radius when the first tier finds nothing
    pub expanded_radius: f64,
    /// Half-length of the facility placed around the snap position
    pub snap_padding: f64,
    /// Minimum longitudinal spacing between two points on one edge
    pub dedup_threshold: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            initial_radius: 100.0,
            expanded_radius: 500.0,
            snap_padding: 5.0,
            dedup_threshold: 10.0,
        }
    }
}

/// Outcome of snapping one query point onto the network. Transient,
/// only the derived registry [`Point`](crate::registry::Point) is
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapResult {
    pub edge_id: EdgeId,
    /// Arc length from the edge start to the projection point
    pub longitudinal_offset: f64,
    /// Perpendicular distance from the query point to the edge
    pub lateral_distance: f64,
}
