//! Node identities and peer records.

use closepeer_coord::Coordinate;
use serde::{Deserialize, Serialize};

/// Identity of a participating node.
///
/// Issued by whoever registers nodes with the network; the close-peer core
/// never invents one. Two ids are the same node iff they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Raw numeric value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A peer offered for merging: an identity plus a copy of its coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<C> {
    /// The offered peer.
    pub id: NodeId,
    /// Copy of the peer's coordinate as seen by whoever offered it.
    pub coord: C,
}

impl<C> Candidate<C> {
    /// Create a new candidate.
    pub fn new(id: NodeId, coord: C) -> Self {
        Self { id, coord }
    }
}

impl<C> From<(NodeId, C)> for Candidate<C> {
    fn from((id, coord): (NodeId, C)) -> Self {
        Self { id, coord }
    }
}

/// A known close peer.
///
/// `distance` is a cache: the distance from the owning node's coordinate to
/// `coord` as of the last recomputation. It is not rederived on read and may
/// lag behind `coord` after a lazy refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRecord<C> {
    /// The peer's identity.
    pub id: NodeId,
    /// Owned copy of the peer's coordinate.
    pub coord: C,
    /// Cached distance from the owner's coordinate.
    pub distance: f64,
}

impl<C: Coordinate> PeerRecord<C> {
    /// Build a record, computing the distance from `origin`.
    ///
    /// Returns `None` if the distance is not a finite, non-negative number.
    pub fn measured(id: NodeId, coord: C, origin: &C) -> Option<Self> {
        let distance = origin.distance(&coord);
        measurable(distance).then(|| Self { id, coord, distance })
    }

    /// Replace the cached coordinate and recompute the distance from `origin`.
    ///
    /// An unmeasurable coordinate leaves the record untouched and returns false.
    pub fn remeasure(&mut self, coord: C, origin: &C) -> bool {
        let distance = origin.distance(&coord);
        if !measurable(distance) {
            return false;
        }
        self.coord = coord;
        self.distance = distance;
        true
    }
}

fn measurable(distance: f64) -> bool {
    distance.is_finite() && distance >= 0.0
}

impl<C> From<PeerRecord<C>> for Candidate<C> {
    fn from(record: PeerRecord<C>) -> Self {
        Self {
            id: record.id,
            coord: record.coord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use closepeer_coord::EuclideanCoord;

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(7).to_string(), "n7");
        assert_eq!(NodeId::from(3).value(), 3);
    }

    #[test]
    fn measured_computes_distance() {
        let origin = EuclideanCoord::new(0.0, 0.0);
        let record =
            PeerRecord::measured(NodeId(1), EuclideanCoord::new(6.0, 8.0), &origin).unwrap();
        assert_eq!(record.distance, 10.0);
    }

    #[test]
    fn measured_rejects_non_finite_distance() {
        let origin = EuclideanCoord::new(0.0, 0.0);
        let far = EuclideanCoord::new(f64::INFINITY, 0.0);
        assert!(PeerRecord::measured(NodeId(1), far, &origin).is_none());
    }

    #[test]
    fn remeasure_discards_previous_distance() {
        let origin = EuclideanCoord::new(0.0, 0.0);
        let mut record =
            PeerRecord::measured(NodeId(1), EuclideanCoord::new(6.0, 8.0), &origin).unwrap();
        assert!(record.remeasure(EuclideanCoord::new(0.0, 2.0), &origin));
        assert_eq!(record.distance, 2.0);
        assert_eq!(record.coord, EuclideanCoord::new(0.0, 2.0));
    }

    #[test]
    fn remeasure_keeps_record_on_nan() {
        let origin = EuclideanCoord::new(0.0, 0.0);
        let mut record =
            PeerRecord::measured(NodeId(1), EuclideanCoord::new(6.0, 8.0), &origin).unwrap();
        assert!(!record.remeasure(EuclideanCoord::new(f64::NAN, 0.0), &origin));
        assert_eq!(record.distance, 10.0);
        assert_eq!(record.coord, EuclideanCoord::new(6.0, 8.0));
    }

    #[test]
    fn record_converts_to_candidate() {
        let record = PeerRecord {
            id: NodeId(9),
            coord: EuclideanCoord::new(1.0, 1.0),
            distance: 42.0,
        };
        let candidate: Candidate<_> = record.into();
        assert_eq!(candidate.id, NodeId(9));
        assert_eq!(candidate.coord, EuclideanCoord::new(1.0, 1.0));
    }
}
