//! Virtual Coordinates
//!
//! Every node is embedded in a synthetic metric space so that the distance
//! between two positions approximates the latency between the two nodes.
//!
//! # Capability
//!
//! The close-peer core never owns an authoritative coordinate. It holds
//! *copies* received from the coordinate service and needs exactly two
//! operations on them:
//!
//! - `distance(other)`: non-negative, symmetric, zero iff equal
//! - `update(other)`: fold a fresher snapshot into the local copy
//!
//! How coordinates converge (spring relaxation and friends) lives in the
//! coordinate service, not here.

mod euclidean;

pub use euclidean::EuclideanCoord;

/// A position in a virtual coordinate space.
///
/// Implementations must keep `distance` non-negative and symmetric.
/// `update` mutates only the receiver.
pub trait Coordinate: Clone {
    /// Estimated distance between two positions.
    fn distance(&self, other: &Self) -> f64;

    /// Merge a fresher snapshot of the same node's position into this copy.
    fn update(&mut self, other: &Self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farthest<C: Coordinate>(origin: &C, points: &[C]) -> Option<f64> {
        points
            .iter()
            .map(|p| origin.distance(p))
            .max_by(f64::total_cmp)
    }

    #[test]
    fn trait_is_usable_generically() {
        let origin = EuclideanCoord::ORIGIN;
        let points = [
            EuclideanCoord::new(3.0, 4.0),
            EuclideanCoord::new(1.0, 0.0),
        ];
        assert_eq!(farthest(&origin, &points), Some(5.0));
    }
}
