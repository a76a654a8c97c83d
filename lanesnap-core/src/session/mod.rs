//! Operator session facade
//!
//! One `Session` holds everything a placement workflow needs: the
//! current network handle, the point registry, the placement
//! lifecycle, the optional working area, and the click log. It is
//! owned by the caller and passed into each operation; there is no
//! process-wide state.

pub mod placement;

use geo::Point as PlanarPoint;
use log::{info, warn};

use crate::export::write_facilities;
use crate::loading;
use crate::model::{IdentityProjection, PlanarProjection, RoadNetwork};
use crate::registry::{GeoLocation, NetworkBounds, Point, PointKind, PointRegistry};
use crate::snap::{SnapConfig, SnapResult, locate_best};
use crate::{Error, MAX_CLICK_HISTORY};

pub use placement::{PendingPlacement, PlacementState};

/// Outcome of a pick
#[derive(Debug, Clone, PartialEq)]
pub enum Pick {
    /// A candidate edge was found; the placement is now pending.
    Pending(SnapResult),
    /// Nothing within the expanded search radius, or no network loaded.
    NoNetworkNearby,
    /// The pick lies outside the configured working area.
    OutsideWorkArea,
}

/// Outcome of confirming a pending placement
#[derive(Debug, Clone, PartialEq)]
pub enum Confirm {
    Added(Point),
    /// The placement collided with an existing point and stays
    /// pending for correction.
    Duplicate { existing: u64 },
}

/// Operator-set working area in geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkArea {
    pub min: GeoLocation,
    pub max: GeoLocation,
}

impl WorkArea {
    pub fn contains(&self, geo: GeoLocation) -> bool {
        (self.min.lat..=self.max.lat).contains(&geo.lat)
            && (self.min.lon..=self.max.lon).contains(&geo.lon)
    }
}

/// A placement session: network handle, point registry, and placement
/// state machine.
pub struct Session {
    network: Option<RoadNetwork>,
    projection: Box<dyn PlanarProjection + Send + Sync>,
    registry: PointRegistry,
    placement: PlacementState,
    config: SnapConfig,
    work_area: Option<WorkArea>,
    click_history: Vec<GeoLocation>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SnapConfig::default())
    }

    pub fn with_config(config: SnapConfig) -> Self {
        Self {
            network: None,
            projection: Box::new(IdentityProjection),
            registry: PointRegistry::new(),
            placement: PlacementState::Idle,
            config,
            work_area: None,
            click_history: Vec::new(),
        }
    }

    /// Loads a SUMO network file and installs it together with the
    /// projection recovered from its `<location>` element.
    ///
    /// # Errors
    ///
    /// Load failures leave the previously installed network in place.
    pub fn load_network_file(&mut self, path: &std::path::Path) -> Result<(), Error> {
        let loaded = loading::load_network(path)?;
        self.install_network(loaded.network, Box::new(loaded.projection));
        Ok(())
    }

    /// As [`Self::load_network_file`], from an XML string.
    pub fn load_network_xml(&mut self, xml: &str) -> Result<(), Error> {
        let loaded = loading::parse_network(xml)?;
        self.install_network(loaded.network, Box::new(loaded.projection));
        Ok(())
    }

    /// Swaps the network wholesale. Points already collected keep
    /// their edge references and are not re-validated against the new
    /// network.
    pub fn install_network(
        &mut self,
        network: RoadNetwork,
        projection: Box<dyn PlanarProjection + Send + Sync>,
    ) {
        info!("Installed network with {} edges", network.edge_count());
        self.network = Some(network);
        self.projection = projection;
    }

    pub fn network(&self) -> Option<&RoadNetwork> {
        self.network.as_ref()
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Restricts picks to a geographic rectangle; `None` lifts the
    /// restriction.
    pub fn set_work_area(&mut self, area: Option<WorkArea>) {
        self.work_area = area;
    }

    /// Resolves a query location against the current network.
    ///
    /// On success the placement enters the pending state with the
    /// default facility kind; a pick while another placement is
    /// pending replaces it (last click wins).
    pub fn on_location_picked(&mut self, geo: GeoLocation) -> Pick {
        if let Some(area) = &self.work_area {
            if !area.contains(geo) {
                return Pick::OutsideWorkArea;
            }
        }
        self.record_click(geo);

        let Some(network) = &self.network else {
            warn!("pick at ({}, {}) with no network loaded", geo.lat, geo.lon);
            return Pick::NoNetworkNearby;
        };

        let planar = self.projection.to_planar(PlanarPoint::new(geo.lon, geo.lat));
        let Ok(best) = locate_best(network, planar, &self.config) else {
            warn!(
                "no edge within {} units of ({}, {})",
                self.config.expanded_radius, geo.lat, geo.lon
            );
            return Pick::NoNetworkNearby;
        };

        let snap = best.to_snap_result();
        self.placement.begin(PendingPlacement {
            geo,
            snap: snap.clone(),
            kind: PointKind::Stop,
            name: None,
        });
        Pick::Pending(snap)
    }

    pub fn pending(&self) -> Option<&PendingPlacement> {
        self.placement.pending()
    }

    /// # Errors
    ///
    /// Returns [`Error::NoPendingPlacement`] outside the pending state.
    pub fn set_pending_kind(&mut self, kind: PointKind) -> Result<(), Error> {
        self.placement
            .pending_mut()
            .map(|placement| placement.kind = kind)
            .ok_or(Error::NoPendingPlacement)
    }

    /// # Errors
    ///
    /// Returns [`Error::NoPendingPlacement`] outside the pending state.
    pub fn set_pending_name(&mut self, name: Option<String>) -> Result<(), Error> {
        self.placement
            .pending_mut()
            .map(|placement| placement.name = name)
            .ok_or(Error::NoPendingPlacement)
    }

    /// Commits the pending placement to the registry.
    ///
    /// A duplicate is reported as [`Confirm::Duplicate`] and the
    /// placement stays pending so the operator can correct it rather
    /// than lose it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPendingPlacement`] when nothing is pending
    /// and [`Error::UnknownEdge`] when the network was swapped and no
    /// longer carries the snapped edge.
    pub fn confirm_pending(
        &mut self,
        kind: PointKind,
        name: Option<String>,
    ) -> Result<Confirm, Error> {
        let pending = self
            .placement
            .pending()
            .cloned()
            .ok_or(Error::NoPendingPlacement)?;

        let edge_length = self
            .network
            .as_ref()
            .and_then(|network| network.get(&pending.snap.edge_id))
            .map(|edge| edge.length)
            .ok_or_else(|| Error::UnknownEdge(pending.snap.edge_id.clone()))?;

        match self.registry.add(
            kind,
            name,
            pending.geo,
            &pending.snap,
            edge_length,
            &self.config,
        ) {
            Ok(point) => {
                info!(
                    "added point {} ({}) on edge {} at {:.2}",
                    point.id,
                    point.kind.tag(),
                    point.edge_id,
                    point.snap_offset
                );
                self.placement.cancel();
                Ok(Confirm::Added(point))
            }
            Err(Error::Duplicate { existing }) => {
                warn!(
                    "placement on edge {} collides with point {existing}, keeping it pending",
                    pending.snap.edge_id
                );
                Ok(Confirm::Duplicate { existing })
            }
            Err(other) => Err(other),
        }
    }

    /// Discards the pending placement, if any.
    pub fn cancel_pending(&mut self) {
        self.placement.cancel();
    }

    /// Points in insertion order
    pub fn list_points(&self) -> &[Point] {
        self.registry.list()
    }

    /// # Errors
    ///
    /// Returns [`Error::PointNotFound`] for an unknown id.
    pub fn delete_point(&mut self, id: u64) -> Result<(), Error> {
        self.registry.remove(id).map(|_| ())
    }

    pub fn clear_points(&mut self) {
        self.registry.clear();
    }

    /// Serializes the registry, the current network bounds, and the
    /// click log.
    pub fn export_snapshot(&self) -> Result<String, Error> {
        let bounds = self
            .network
            .as_ref()
            .map(|network| NetworkBounds::from(network.bounds()));
        let clicks = (!self.click_history.is_empty()).then_some(self.click_history.as_slice());
        self.registry.export_json(bounds, clicks)
    }

    /// Replaces the registry (and click log, when present in the
    /// snapshot) wholesale. Returns the number of imported points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] on schema mismatch; nothing is
    /// replaced in that case.
    pub fn import_snapshot(&mut self, blob: &str) -> Result<usize, Error> {
        let snapshot = self.registry.import_json(blob)?;
        if let Some(clicks) = snapshot.click_history {
            self.click_history = clicks;
        }
        Ok(self.registry.len())
    }

    /// Renders the SUMO additional-file for all collected points.
    pub fn export_facilities(&self) -> String {
        write_facilities(self.registry.list())
    }

    pub fn click_history(&self) -> &[GeoLocation] {
        &self.click_history
    }

    fn record_click(&mut self, geo: GeoLocation) {
        self.click_history.push(geo);
        if self.click_history.len() > MAX_CLICK_HISTORY {
            self.click_history.remove(0);
        }
    }
}
