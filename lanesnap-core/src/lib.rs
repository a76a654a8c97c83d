//! Network snapping for SUMO facility placement
//!
//! An operator marks points of interest (vehicle stops, charging
//! stations) on top of a SUMO road network. Each pick is snapped to
//! the nearest drivable edge at a precise longitudinal position and,
//! once confirmed, collected into a registry that exports both a JSON
//! snapshot of the in-progress work and a SUMO additional-file for
//! the downstream simulator.
//!
//! The [`Session`] facade ties the pieces together: network model,
//! edge locator, placement lifecycle, and point registry.

pub mod error;
pub mod export;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod registry;
pub mod session;
pub mod snap;

pub use error::Error;
pub use session::Session;

/// SUMO edge identifier
pub type EdgeId = String;

/// Picks remembered per session for the snapshot click log
pub const MAX_CLICK_HISTORY: usize = 100;
