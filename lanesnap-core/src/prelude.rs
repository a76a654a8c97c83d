// Re-export key components
pub use crate::EdgeId;
pub use crate::MAX_CLICK_HISTORY;
pub use crate::error::Error;
pub use crate::export::write_facilities;
pub use crate::loading::{LoadedNetwork, load_network, parse_network};
pub use crate::model::{
    Edge, IdentityProjection, NetOffsetProjection, PlanarProjection, RoadNetwork,
};
pub use crate::registry::{
    GeoLocation, NetworkBounds, Point, PointKind, PointRegistry, Snapshot,
};
pub use crate::session::{Confirm, PendingPlacement, Pick, Session, WorkArea};
pub use crate::snap::{EdgeMatch, SnapConfig, SnapResult, locate, locate_best, project};
