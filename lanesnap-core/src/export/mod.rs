//! Writers for downstream consumers

mod facilities;

pub use facilities::write_facilities;
