//! Stand-in virtual-coordinate service.
//!
//! Every node has a hidden true position and a published estimate. The
//! estimate starts off by a random error and each `tick` closes a fixed
//! fraction of the gap, which is enough to exercise coordinate refresh
//! without modelling a real embedding algorithm.

use std::collections::BTreeMap;

use closepeer::{CoordinateSource, NodeId};
use closepeer_coord::{Coordinate, EuclideanCoord};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
struct Position {
    truth: EuclideanCoord,
    published: EuclideanCoord,
}

/// Publishes a slowly converging coordinate for every placed node.
#[derive(Debug, Clone, Default)]
pub struct CoordinateService {
    positions: BTreeMap<NodeId, Position>,
    drift: f64,
}

impl CoordinateService {
    /// Create an empty service. `drift` is clamped to `[0, 1]`.
    pub fn new(drift: f64) -> Self {
        Self {
            positions: BTreeMap::new(),
            drift: drift.clamp(0.0, 1.0),
        }
    }

    /// Place a node with explicit true and published positions.
    pub fn place(&mut self, node: NodeId, truth: EuclideanCoord, published: EuclideanCoord) {
        self.positions.insert(node, Position { truth, published });
    }

    /// Place a node uniformly in `[0, spread)^2` with a published estimate
    /// off by up to `jitter * spread` on each axis.
    pub fn place_random<R: Rng + ?Sized>(
        &mut self,
        node: NodeId,
        spread: f64,
        jitter: f64,
        rng: &mut R,
    ) {
        let truth = EuclideanCoord::new(rng.gen_range(0.0..spread), rng.gen_range(0.0..spread));
        let reach = jitter * spread;
        let offset = if reach > 0.0 {
            EuclideanCoord::new(rng.gen_range(-reach..reach), rng.gen_range(-reach..reach))
        } else {
            EuclideanCoord::ORIGIN
        };
        self.place(node, truth, truth + offset);
    }

    /// Advance every published estimate toward its true position.
    pub fn tick(&mut self) {
        for position in self.positions.values_mut() {
            position.published = position.published.step_toward(&position.truth, self.drift);
        }
    }

    /// True position of a node.
    pub fn truth_of(&self, node: NodeId) -> Option<EuclideanCoord> {
        self.positions.get(&node).map(|p| p.truth)
    }

    /// Mean distance between published estimates and true positions.
    pub fn mean_error(&self) -> f64 {
        if self.positions.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .positions
            .values()
            .map(|p| p.published.distance(&p.truth))
            .sum();
        total / self.positions.len() as f64
    }

    /// Number of placed nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if no node is placed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl CoordinateSource<EuclideanCoord> for CoordinateService {
    fn coordinate_of(&self, node: NodeId) -> Option<EuclideanCoord> {
        self.positions.get(&node).map(|p| p.published)
    }
}
