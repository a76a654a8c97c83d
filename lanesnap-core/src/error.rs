use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network load error: {0}")]
    Load(String),
    #[error("No edge found near the query point")]
    NoNearbyEdge,
    #[error("A placement already exists near point {existing} on this edge")]
    Duplicate { existing: u64 },
    #[error("No point with id {0}")]
    PointNotFound(u64),
    #[error("Snapshot format error: {0}")]
    Format(String),
    #[error("No placement is pending")]
    NoPendingPlacement,
    #[error("Edge {0} is not part of the current network")]
    UnknownEdge(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}
