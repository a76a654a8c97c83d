//! Radius-expanding candidate search over the network

use geo::Point;
use log::debug;

use super::{SnapConfig, SnapResult, project};
use crate::Error;
use crate::model::{Edge, RoadNetwork};

/// A candidate edge for a query point
#[derive(Debug, Clone)]
pub struct EdgeMatch<'a> {
    pub edge: &'a Edge,
    pub longitudinal_offset: f64,
    pub lateral_distance: f64,
}

impl EdgeMatch<'_> {
    pub fn to_snap_result(&self) -> SnapResult {
        SnapResult {
            edge_id: self.edge.id.clone(),
            longitudinal_offset: self.longitudinal_offset,
            lateral_distance: self.lateral_distance,
        }
    }
}

/// Finds edges near a planar query point, nearest first.
///
/// Candidates are prefiltered by bounding box against a disk of the
/// initial radius, then projected exactly and kept when their lateral
/// distance fits the radius. An empty first tier is retried once at
/// the expanded radius; an empty result after that means there is no
/// network nearby, the caller decides how to surface it. Matches are
/// ordered by lateral distance with ties broken by edge id, so
/// results are deterministic.
pub fn locate<'a>(
    network: &'a RoadNetwork,
    point: Point<f64>,
    config: &SnapConfig,
) -> Vec<EdgeMatch<'a>> {
    for (tier, radius) in [config.initial_radius, config.expanded_radius]
        .into_iter()
        .enumerate()
    {
        let mut matches: Vec<EdgeMatch<'a>> = network
            .edges_near(point.0, radius)
            .map(|edge| {
                let (longitudinal_offset, lateral_distance) = project(edge, point);
                EdgeMatch {
                    edge,
                    longitudinal_offset,
                    lateral_distance,
                }
            })
            .filter(|candidate| candidate.lateral_distance <= radius)
            .collect();

        if !matches.is_empty() {
            matches.sort_by(|a, b| {
                a.lateral_distance
                    .total_cmp(&b.lateral_distance)
                    .then_with(|| a.edge.id.cmp(&b.edge.id))
            });
            return matches;
        }

        if tier == 0 {
            debug!(
                "no edge within {radius} units of ({}, {}), expanding search",
                point.x(),
                point.y()
            );
        }
    }

    Vec::new()
}

/// As [`locate`], reduced to the single nearest match.
///
/// # Errors
///
/// Returns [`Error::NoNearbyEdge`] when both search tiers come up
/// empty.
pub fn locate_best<'a>(
    network: &'a RoadNetwork,
    point: Point<f64>,
    config: &SnapConfig,
) -> Result<EdgeMatch<'a>, Error> {
    locate(network, point, config)
        .into_iter()
        .next()
        .ok_or(Error::NoNearbyEdge)
}
