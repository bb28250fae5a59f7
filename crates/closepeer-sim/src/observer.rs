//! Per-cycle controls run by the scheduler after every node has stepped.

use closepeer::{EuclideanCoord, GossipNetwork, NetworkStats};
use tracing::info;

/// A control invoked once per cycle, after all gossip steps.
pub trait Control {
    /// Inspect the network. Returning true halts the simulation.
    fn execute(&mut self, cycle: u64, network: &GossipNetwork<EuclideanCoord>) -> bool;
}

/// Reports close-peer distance statistics every cycle.
///
/// Purely diagnostic: never mutates the network and never halts.
#[derive(Debug, Clone)]
pub struct ClosePeerObserver {
    name: String,
    history: Vec<NetworkStats>,
}

impl ClosePeerObserver {
    /// Create an observer that logs under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            history: Vec::new(),
        }
    }

    /// Statistics from every cycle observed so far.
    pub fn history(&self) -> &[NetworkStats] {
        &self.history
    }

    /// Statistics from the most recent cycle.
    pub fn latest(&self) -> Option<&NetworkStats> {
        self.history.last()
    }
}

impl Control for ClosePeerObserver {
    fn execute(&mut self, cycle: u64, network: &GossipNetwork<EuclideanCoord>) -> bool {
        let stats = network.stats();
        info!(
            observer = %self.name,
            cycle,
            avg = stats.avg,
            lowest = stats.min.unwrap_or(0.0),
            highest = stats.max.unwrap_or(0.0),
            "close-peer distances"
        );
        self.history.push(stats);
        false
    }
}

/// Halts the simulation once the average close-peer distance is at or
/// below a target.
#[derive(Debug, Clone, Copy)]
pub struct DistanceTarget {
    target: f64,
}

impl DistanceTarget {
    /// Halt once the network-wide average reaches `target`.
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl Control for DistanceTarget {
    fn execute(&mut self, cycle: u64, network: &GossipNetwork<EuclideanCoord>) -> bool {
        let stats = network.stats();
        let reached = stats.peers > 0 && stats.avg <= self.target;
        if reached {
            info!(cycle, avg = stats.avg, target = self.target, "distance target reached");
        }
        reached
    }
}
