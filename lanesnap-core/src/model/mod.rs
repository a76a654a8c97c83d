//! Road network model
//!
//! Immutable in-memory representation of a SUMO network: edges as
//! ordered polylines in planar coordinates, plus a spatial index over
//! their bounding boxes for nearby-edge queries.

pub mod components;
pub mod network;
pub mod projection;

pub use components::Edge;
pub use network::RoadNetwork;
pub use projection::{IdentityProjection, NetOffsetProjection, PlanarProjection};
