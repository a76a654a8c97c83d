//! Immutable road network with a spatial index over edge bounds

use geo::{Coord, Rect};
use hashbrown::HashMap;
use rstar::RTree;
use rstar::primitives::{GeomWithData, Rectangle};

use super::components::Edge;
use crate::{EdgeId, Error};

/// Edge bounding box in the R-tree, carrying the edge's index in the
/// document-order edge list.
type IndexedEdge = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// In-memory road network
///
/// Built once at load time and never mutated afterwards; a session
/// swaps the whole network when a new source is loaded. Safe to share
/// read-only across threads.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    edges: Vec<Edge>,
    by_id: HashMap<EdgeId, usize>,
    bounds: Rect<f64>,
    rtree: RTree<IndexedEdge>,
}

impl RoadNetwork {
    /// Builds a network from edges in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if there are no edges, an edge has
    /// fewer than two shape points or zero length, or an edge id is
    /// duplicated.
    pub fn new(edges: Vec<Edge>) -> Result<Self, Error> {
        if edges.is_empty() {
            return Err(Error::Load("network contains no drivable edges".into()));
        }

        let mut by_id = HashMap::with_capacity(edges.len());
        for (idx, edge) in edges.iter().enumerate() {
            if edge.shape.0.len() < 2 {
                return Err(Error::Load(format!(
                    "edge {} has fewer than 2 shape points",
                    edge.id
                )));
            }
            if edge.length <= 0.0 {
                return Err(Error::Load(format!("edge {} has zero length", edge.id)));
            }
            if by_id.insert(edge.id.clone(), idx).is_some() {
                return Err(Error::Load(format!("duplicate edge id {}", edge.id)));
            }
        }

        let bounds = network_bounds(&edges);
        let rtree = RTree::bulk_load(
            edges
                .iter()
                .enumerate()
                .map(|(idx, edge)| IndexedEdge::new(edge_envelope(edge), idx))
                .collect(),
        );

        Ok(Self {
            edges,
            by_id,
            bounds,
            rtree,
        })
    }

    /// Edges in stable document order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn get(&self, id: &str) -> Option<&Edge> {
        self.by_id.get(id).map(|&idx| &self.edges[idx])
    }

    /// Axis-aligned bounding box of all edge shapes
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges whose bounding box intersects a disk around `center`.
    ///
    /// This is the cheap prefilter for the locator; callers still
    /// have to project onto each candidate for the exact distance.
    pub fn edges_near(&self, center: Coord<f64>, radius: f64) -> impl Iterator<Item = &Edge> + '_ {
        self.rtree
            .locate_within_distance([center.x, center.y], radius * radius)
            .map(|entry| &self.edges[entry.data])
    }
}

fn edge_envelope(edge: &Edge) -> Rectangle<[f64; 2]> {
    let (min, max) = coord_extent(edge.shape.0.iter().copied());
    Rectangle::from_corners([min.x, min.y], [max.x, max.y])
}

fn network_bounds(edges: &[Edge]) -> Rect<f64> {
    let (min, max) = coord_extent(edges.iter().flat_map(|edge| edge.shape.0.iter().copied()));
    Rect::new(min, max)
}

fn coord_extent(coords: impl Iterator<Item = Coord<f64>>) -> (Coord<f64>, Coord<f64>) {
    let mut min = Coord {
        x: f64::INFINITY,
        y: f64::INFINITY,
    };
    let mut max = Coord {
        x: f64::NEG_INFINITY,
        y: f64::NEG_INFINITY,
    };
    for coord in coords {
        min.x = min.x.min(coord.x);
        min.y = min.y.min(coord.y);
        max.x = max.x.max(coord.x);
        max.y = max.y.max(coord.y);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;

    fn edge(id: &str, shape: geo::LineString<f64>) -> Edge {
        Edge::new(id.into(), shape)
    }

    #[test]
    fn bounds_cover_all_shapes() {
        let network = RoadNetwork::new(vec![
            edge("E0", line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]),
            edge("E1", line_string![(x: 50.0, y: -20.0), (x: 50.0, y: 80.0)]),
        ])
        .unwrap();

        let bounds = network.bounds();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: -20.0 });
        assert_eq!(bounds.max(), Coord { x: 100.0, y: 80.0 });
    }

    #[test]
    fn duplicate_edge_id_is_rejected() {
        let result = RoadNetwork::new(vec![
            edge("E0", line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]),
            edge("E0", line_string![(x: 2.0, y: 0.0), (x: 3.0, y: 0.0)]),
        ]);
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn short_shape_is_rejected() {
        let result = RoadNetwork::new(vec![Edge::new(
            "E0".into(),
            geo::LineString::new(vec![Coord { x: 0.0, y: 0.0 }]),
        )]);
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn zero_length_edge_is_rejected() {
        let result = RoadNetwork::new(vec![edge(
            "E0",
            line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)],
        )]);
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn lookup_by_id() {
        let network = RoadNetwork::new(vec![
            edge("E0", line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]),
            edge("E1", line_string![(x: 0.0, y: 1.0), (x: 1.0, y: 1.0)]),
        ])
        .unwrap();

        assert_eq!(network.get("E1").unwrap().id, "E1");
        assert!(network.get("E2").is_none());
        assert_eq!(network.edge_count(), 2);
    }

    #[test]
    fn edges_near_filters_by_bounding_box() {
        let network = RoadNetwork::new(vec![
            edge("near", line_string![(x: 0.0, y: 10.0), (x: 10.0, y: 10.0)]),
            edge("far", line_string![(x: 0.0, y: 900.0), (x: 10.0, y: 900.0)]),
        ])
        .unwrap();

        let found: Vec<&str> = network
            .edges_near(Coord { x: 5.0, y: 0.0 }, 50.0)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(found, vec!["near"]);
    }
}
