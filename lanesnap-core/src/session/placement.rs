//! Click to pending to confirm/cancel lifecycle

use crate::registry::{GeoLocation, PointKind};
use crate::snap::SnapResult;

/// A placement awaiting confirm or cancel
///
/// Exists only between a pick and its confirm/cancel; discarded on
/// either. Holds the operator's in-progress kind/name choice.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    /// Original query location
    pub geo: GeoLocation,
    /// Snap computed against the network current at pick time
    pub snap: SnapResult,
    pub kind: PointKind,
    pub name: Option<String>,
}

/// Placement lifecycle state. Confirmed and Cancelled are transitions
/// back to Idle, not stored states.
#[derive(Debug, Default)]
pub enum PlacementState {
    #[default]
    Idle,
    Pending(PendingPlacement),
}

impl PlacementState {
    /// Last click wins: replaces any placement already pending.
    pub fn begin(&mut self, placement: PendingPlacement) {
        *self = Self::Pending(placement);
    }

    /// Discards the pending placement unconditionally.
    pub fn cancel(&mut self) -> Option<PendingPlacement> {
        match std::mem::take(self) {
            Self::Pending(placement) => Some(placement),
            Self::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingPlacement> {
        match self {
            Self::Pending(placement) => Some(placement),
            Self::Idle => None,
        }
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingPlacement> {
        match self {
            Self::Pending(placement) => Some(placement),
            Self::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(edge_id: &str) -> PendingPlacement {
        PendingPlacement {
            geo: GeoLocation { lat: 0.0, lon: 0.0 },
            snap: SnapResult {
                edge_id: edge_id.into(),
                longitudinal_offset: 5.0,
                lateral_distance: 1.0,
            },
            kind: PointKind::Stop,
            name: None,
        }
    }

    #[test]
    fn begin_replaces_a_pending_placement() {
        let mut state = PlacementState::default();
        state.begin(placement("E0"));
        state.begin(placement("E1"));
        assert_eq!(state.pending().unwrap().snap.edge_id, "E1");
    }

    #[test]
    fn cancel_always_returns_to_idle() {
        let mut state = PlacementState::default();
        assert!(state.cancel().is_none());

        state.begin(placement("E0"));
        assert!(state.cancel().is_some());
        assert!(!state.is_pending());
        assert!(state.cancel().is_none());
    }
}
