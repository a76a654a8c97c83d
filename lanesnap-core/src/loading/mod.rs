//! Loading SUMO plain-XML network descriptions into the model

mod sumo;

pub use sumo::{LoadedNetwork, load_network, parse_network};
