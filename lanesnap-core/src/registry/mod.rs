//! Collected-points store
//!
//! Insertion-ordered registry of confirmed facility placements with
//! duplicate detection, stable monotonic ids, and JSON snapshot
//! import/export for save/restore of in-progress work.

use geo::Rect;
use log::info;
use serde::{Deserialize, Serialize};

use crate::snap::{SnapConfig, SnapResult};
use crate::{EdgeId, Error};

/// Facility kind, tagged with the SUMO additional-file element names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    #[serde(rename = "containerStop")]
    Stop,
    #[serde(rename = "chargingStation")]
    Charge,
}

impl PointKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Stop => "containerStop",
            Self::Charge => "chargingStation",
        }
    }
}

/// A location in geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// A committed registry entry
///
/// Immutable once created; deletion removes it wholesale. The original
/// query location is retained in geographic coordinates for redisplay
/// even though the placement itself is edge-relative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// Monotonically increasing, never reused after deletion
    pub id: u64,
    pub kind: PointKind,
    pub name: Option<String>,
    pub edge_id: EdgeId,
    /// Longitudinal snap position the placement was derived from
    pub snap_offset: f64,
    /// `snap_offset` minus the padding, clamped to the edge start
    pub start_offset: f64,
    /// `snap_offset` plus the padding, clamped to the edge length
    pub end_offset: f64,
    pub geo: GeoLocation,
}

/// Network bounds as stored in snapshots, planar coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl From<Rect<f64>> for NetworkBounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        }
    }
}

/// Snapshot interchange document for save/restore
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub points: Vec<Point>,
    pub bounds: Option<NetworkBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_history: Option<Vec<GeoLocation>>,
}

/// Insertion-ordered store of confirmed placements
#[derive(Debug, Clone)]
pub struct PointRegistry {
    points: Vec<Point>,
    next_id: u64,
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PointRegistry {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            next_id: 1,
        }
    }

    /// Commits a snapped placement as a new point.
    ///
    /// An empty or missing name is replaced with a generated
    /// `<kind>_<n>` label. The placement spans the snap position
    /// padded by `config.snap_padding` on both sides, clamped to the
    /// edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Duplicate`] when the same edge already holds
    /// a point within `config.dedup_threshold` of the snap position;
    /// the registry is left untouched.
    pub fn add(
        &mut self,
        kind: PointKind,
        name: Option<String>,
        geo: GeoLocation,
        snap: &SnapResult,
        edge_length: f64,
        config: &SnapConfig,
    ) -> Result<Point, Error> {
        if let Some(existing) = self.points.iter().find(|point| {
            point.edge_id == snap.edge_id
                && (point.snap_offset - snap.longitudinal_offset).abs() < config.dedup_threshold
        }) {
            return Err(Error::Duplicate {
                existing: existing.id,
            });
        }

        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{}_{}", kind.tag(), self.points.len() + 1));

        let point = Point {
            id: self.next_id,
            kind,
            name: Some(name),
            edge_id: snap.edge_id.clone(),
            snap_offset: snap.longitudinal_offset,
            start_offset: (snap.longitudinal_offset - config.snap_padding).max(0.0),
            end_offset: (snap.longitudinal_offset + config.snap_padding).min(edge_length),
            geo,
        };
        self.next_id += 1;
        self.points.push(point.clone());
        Ok(point)
    }

    /// # Errors
    ///
    /// Returns [`Error::PointNotFound`] if no point carries this id.
    pub fn remove(&mut self, id: u64) -> Result<Point, Error> {
        let position = self
            .points
            .iter()
            .position(|point| point.id == id)
            .ok_or(Error::PointNotFound(id))?;
        Ok(self.points.remove(position))
    }

    /// Points in insertion order
    pub fn list(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Empties the registry. The id counter is not reset, so ids of
    /// cleared points are never reissued.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Serializes the registry plus the last-known network bounds and
    /// optional click log.
    pub fn export_json(
        &self,
        bounds: Option<NetworkBounds>,
        click_history: Option<&[GeoLocation]>,
    ) -> Result<String, Error> {
        let snapshot = Snapshot {
            points: self.points.clone(),
            bounds,
            click_history: click_history.map(<[GeoLocation]>::to_vec),
        };
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Format(e.to_string()))
    }

    /// Replaces the registry contents with an exported snapshot.
    ///
    /// All-or-nothing: on any validation failure the current contents
    /// stay untouched. Imported ids are preserved and the counter
    /// continues past the largest of them. Edge references are not
    /// re-validated against a live network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] on schema mismatch, duplicate ids,
    /// or inverted offsets.
    pub fn import_json(&mut self, blob: &str) -> Result<Snapshot, Error> {
        let snapshot: Snapshot =
            serde_json::from_str(blob).map_err(|e| Error::Format(e.to_string()))?;

        let mut seen = hashbrown::HashSet::with_capacity(snapshot.points.len());
        for point in &snapshot.points {
            if !seen.insert(point.id) {
                return Err(Error::Format(format!("duplicate point id {}", point.id)));
            }
            if point.start_offset >= point.end_offset {
                return Err(Error::Format(format!(
                    "point {} has an inverted offset range",
                    point.id
                )));
            }
        }

        self.points = snapshot.points.clone();
        self.next_id = self.points.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        info!("Imported {} points from snapshot", self.points.len());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(edge_id: &str, offset: f64) -> SnapResult {
        SnapResult {
            edge_id: edge_id.into(),
            longitudinal_offset: offset,
            lateral_distance: 1.0,
        }
    }

    fn geo() -> GeoLocation {
        GeoLocation {
            lat: 39.77,
            lon: 30.52,
        }
    }

    fn add(registry: &mut PointRegistry, edge_id: &str, offset: f64) -> Result<Point, Error> {
        registry.add(
            PointKind::Stop,
            None,
            geo(),
            &snap(edge_id, offset),
            100.0,
            &SnapConfig::default(),
        )
    }

    #[test]
    fn offsets_are_padded_and_clamped() {
        let mut registry = PointRegistry::new();
        let point = add(&mut registry, "E0", 2.0).unwrap();
        assert_eq!(point.start_offset, 0.0);
        assert_eq!(point.end_offset, 7.0);

        let point = add(&mut registry, "E0", 98.0).unwrap();
        assert_eq!(point.start_offset, 93.0);
        assert_eq!(point.end_offset, 100.0);
    }

    #[test]
    fn nearby_placement_on_same_edge_is_a_duplicate() {
        let mut registry = PointRegistry::new();
        let first = add(&mut registry, "E0", 0.0).unwrap();

        match add(&mut registry, "E0", 9.9) {
            Err(Error::Duplicate { existing }) => assert_eq!(existing, first.id),
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(registry.len(), 1);

        // Just past the threshold is fine, and so is the same offset
        // on another edge.
        add(&mut registry, "E0", 10.1).unwrap();
        add(&mut registry, "E1", 0.0).unwrap();
    }

    #[test]
    fn ids_are_stable_across_deletion() {
        let mut registry = PointRegistry::new();
        let first = add(&mut registry, "E0", 0.0).unwrap();
        let second = add(&mut registry, "E0", 20.0).unwrap();
        let third = add(&mut registry, "E0", 40.0).unwrap();

        registry.remove(second.id).unwrap();
        let ids: Vec<u64> = registry.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);

        let fourth = add(&mut registry, "E0", 60.0).unwrap();
        assert!(fourth.id > third.id);
    }

    #[test]
    fn removing_unknown_id_fails() {
        let mut registry = PointRegistry::new();
        assert!(matches!(
            registry.remove(42),
            Err(Error::PointNotFound(42))
        ));
    }

    #[test]
    fn clear_keeps_the_id_counter() {
        let mut registry = PointRegistry::new();
        let before = add(&mut registry, "E0", 0.0).unwrap();
        registry.clear();
        assert!(registry.is_empty());

        let after = add(&mut registry, "E0", 0.0).unwrap();
        assert!(after.id > before.id);
    }

    #[test]
    fn default_names_follow_the_kind_tag() {
        let mut registry = PointRegistry::new();
        let point = registry
            .add(
                PointKind::Charge,
                Some(String::new()),
                geo(),
                &snap("E0", 50.0),
                100.0,
                &SnapConfig::default(),
            )
            .unwrap();
        assert_eq!(point.name.as_deref(), Some("chargingStation_1"));
    }

    #[test]
    fn snapshot_round_trips() {
        let mut registry = PointRegistry::new();
        add(&mut registry, "E0", 20.0).unwrap();
        add(&mut registry, "E1", 50.0).unwrap();

        let blob = registry.export_json(None, None).unwrap();
        let mut restored = PointRegistry::new();
        restored.import_json(&blob).unwrap();

        assert_eq!(restored.list(), registry.list());
    }

    #[test]
    fn import_continues_ids_past_the_snapshot() {
        let mut registry = PointRegistry::new();
        add(&mut registry, "E0", 20.0).unwrap();
        add(&mut registry, "E1", 50.0).unwrap();
        let blob = registry.export_json(None, None).unwrap();

        let mut restored = PointRegistry::new();
        restored.import_json(&blob).unwrap();
        let next = add(&mut restored, "E2", 0.0).unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn failed_import_leaves_registry_untouched() {
        let mut registry = PointRegistry::new();
        add(&mut registry, "E0", 20.0).unwrap();

        assert!(matches!(
            registry.import_json("{\"points\": \"nope\"}"),
            Err(Error::Format(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_ids_in_snapshot_are_rejected() {
        let mut registry = PointRegistry::new();
        add(&mut registry, "E0", 20.0).unwrap();
        let mut blob = registry.export_json(None, None).unwrap();
        let single = serde_json::from_str::<Snapshot>(&blob).unwrap().points[0].clone();
        let mut doubled = Snapshot {
            points: vec![single.clone(), single],
            bounds: None,
            click_history: None,
        };
        doubled.points[1].snap_offset += 50.0;
        blob = serde_json::to_string(&doubled).unwrap();

        assert!(matches!(
            registry.import_json(&blob),
            Err(Error::Format(_))
        ));
    }
}
