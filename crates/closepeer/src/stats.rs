//! Network-wide close-peer statistics.
//!
//! Gathered once per cycle after every node has stepped. The average is an
//! average of per-node averages: each node contributes the mean distance of
//! its own set, or 0 when the set is empty, and every node counts once in
//! the denominator.

use serde::{Deserialize, Serialize};

use crate::set::ClosePeerSet;

/// Aggregate distance statistics over every close-peer set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Nodes scanned.
    pub nodes: usize,
    /// Peer entries scanned across all sets.
    pub peers: usize,
    /// Mean over nodes of each node's mean peer distance.
    pub avg: f64,
    /// Smallest distance held by any set.
    pub min: Option<f64>,
    /// Largest distance held by any set.
    pub max: Option<f64>,
}

impl NetworkStats {
    /// Scan a collection of sets. Read-only.
    pub fn collect<'a, C: 'a>(sets: impl IntoIterator<Item = &'a ClosePeerSet<C>>) -> Self {
        let mut stats = Self::default();
        let mut avg_sum = 0.0;

        for set in sets {
            stats.nodes += 1;
            if set.is_empty() {
                continue;
            }

            let mut distance_sum = 0.0;
            for distance in set.distances() {
                distance_sum += distance;
                stats.min = Some(stats.min.map_or(distance, |m| m.min(distance)));
                stats.max = Some(stats.max.map_or(distance, |m| m.max(distance)));
            }
            stats.peers += set.len();
            avg_sum += distance_sum / set.len() as f64;
        }

        if stats.nodes > 0 {
            stats.avg = avg_sum / stats.nodes as f64;
        }
        stats
    }

    /// Mean number of peers held per node.
    pub fn mean_set_size(&self) -> f64 {
        if self.nodes == 0 {
            0.0
        } else {
            self.peers as f64 / self.nodes as f64
        }
    }
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
        write!(
            f,
            "avg distance {:.3}, lowest {}, highest {} ({} peers over {} nodes)",
            self.avg,
            show(self.min),
            show(self.max),
            self.peers,
            self.nodes
        )
    }
}
