//! The per-cycle gossip step.
//!
//! Once per cycle the scheduler calls [`GossipNetwork::step`] for every
//! node. A step:
//!
//! 1. Binds the node's own coordinate on first use
//! 2. Merges the current sample from the peer-sampling service
//! 3. Picks one close peer uniformly at random
//! 4. Sends it a [`ClosenessQuery`] and merges the reply
//! 5. Refreshes the cached coordinate of that peer from the coordinate service
//!
//! Empty samples, missing coordinates and empty sets are ordinary events in
//! an epidemic process; they end the step early and are never errors.

use std::collections::BTreeMap;

use closepeer_coord::Coordinate;
use rand::Rng;
use tracing::{debug, trace};

use crate::config::ClosePeerConfig;
use crate::error::Result;
use crate::exchange::ClosenessReply;
use crate::peer::{Candidate, NodeId};
use crate::set::ClosePeerSet;
use crate::stats::NetworkStats;

/// Source of fresh candidate peers (the random-peer-sampling overlay).
pub trait PeerSampler<C> {
    /// Current sample of live peers for `node`, with their coordinates.
    fn sample(&mut self, node: NodeId) -> Vec<Candidate<C>>;
}

/// Authoritative coordinates (the virtual-coordinate service).
pub trait CoordinateSource<C> {
    /// Snapshot of `node`'s current coordinate, if it has one.
    fn coordinate_of(&self, node: NodeId) -> Option<C>;
}

/// What a single gossip step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The node is not registered with this network.
    Unknown,
    /// No coordinate could be bound yet; nothing was done.
    Unbound,
    /// The set was still empty after sampling; no exchange this cycle.
    Isolated,
    /// An exchange took place.
    Exchanged {
        /// The peer that answered.
        peer: NodeId,
        /// Peers newly learned from its reply that survived truncation.
        learned: usize,
        /// Whether the peer's cached coordinate was refreshed.
        refreshed: bool,
    },
}

impl StepOutcome {
    /// Check if the step reached the exchange.
    pub fn exchanged(&self) -> bool {
        matches!(self, StepOutcome::Exchanged { .. })
    }
}

/// Every node's close-peer set, plus the gossip step that evolves them.
#[derive(Debug, Clone)]
pub struct GossipNetwork<C> {
    config: ClosePeerConfig,
    sets: BTreeMap<NodeId, ClosePeerSet<C>>,
}

impl<C> GossipNetwork<C> {
    /// Create an empty network. Fails if the configuration is invalid.
    pub fn new(config: ClosePeerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sets: BTreeMap::new(),
        })
    }

    /// The configuration every set is built from.
    pub fn config(&self) -> &ClosePeerConfig {
        &self.config
    }

    /// Install an empty, unbound set for `node`.
    ///
    /// Returns false if the node was already registered.
    pub fn register(&mut self, node: NodeId) -> bool {
        if self.sets.contains_key(&node) {
            return false;
        }
        self.sets.insert(node, ClosePeerSet::new(node, self.config));
        true
    }

    /// The close-peer set of `node`.
    pub fn set(&self, node: NodeId) -> Option<&ClosePeerSet<C>> {
        self.sets.get(&node)
    }

    /// Registered nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.sets.keys().copied()
    }

    /// All close-peer sets in ascending owner order.
    pub fn sets(&self) -> impl Iterator<Item = &ClosePeerSet<C>> {
        self.sets.values()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if no node is registered.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Statistics over every set.
    pub fn stats(&self) -> NetworkStats {
        NetworkStats::collect(self.sets.values())
    }
}

impl<C: Coordinate> GossipNetwork<C> {
    /// Run one gossip step for `node`.
    ///
    /// `rng` is the scheduler's shared source and the only randomness used
    /// here, so a fixed seed reproduces the run.
    pub fn step<S, K, R>(
        &mut self,
        node: NodeId,
        sampler: &mut S,
        coords: &K,
        rng: &mut R,
    ) -> StepOutcome
    where
        S: PeerSampler<C> + ?Sized,
        K: CoordinateSource<C> + ?Sized,
        R: Rng + ?Sized,
    {
        // Take the stepping node's set out so the responder can be read
        // while it is being mutated. A node never lists itself, so the
        // responder is always still in the map.
        let Some(mut set) = self.sets.remove(&node) else {
            debug!(%node, "step for unregistered node");
            return StepOutcome::Unknown;
        };

        let outcome = Self::step_set(&self.sets, &mut set, sampler, coords, rng);
        self.sets.insert(node, set);
        outcome
    }

    fn step_set<S, K, R>(
        others: &BTreeMap<NodeId, ClosePeerSet<C>>,
        set: &mut ClosePeerSet<C>,
        sampler: &mut S,
        coords: &K,
        rng: &mut R,
    ) -> StepOutcome
    where
        S: PeerSampler<C> + ?Sized,
        K: CoordinateSource<C> + ?Sized,
        R: Rng + ?Sized,
    {
        let node = set.owner();

        if !set.is_bound() {
            match coords.coordinate_of(node) {
                Some(coord) => {
                    set.bind_coord(coord);
                    trace!(%node, "bound own coordinate");
                }
                None => {
                    debug!(%node, "no coordinate available yet");
                    return StepOutcome::Unbound;
                }
            }
        }

        let sample = sampler.sample(node);
        if sample.is_empty() {
            debug!(%node, "empty sample");
        }
        set.merge(sample);

        if set.is_empty() {
            return StepOutcome::Isolated;
        }

        let index = rng.gen_range(0..set.len());
        let peer = set.peers()[index].id;

        let Some(query) = set.query() else {
            return StepOutcome::Unbound;
        };
        let reply = match others.get(&peer) {
            Some(responder) => responder.answer(&query),
            None => {
                debug!(%node, %peer, "peer has no close-peer set");
                ClosenessReply::empty(peer)
            }
        };
        let offered = reply.len();
        let merged = set.merge(reply.peers);

        let refreshed = match coords.coordinate_of(peer) {
            Some(fresh) => set.refresh_coord(peer, &fresh),
            None => {
                debug!(%node, %peer, "no coordinate for peer, refresh skipped");
                false
            }
        };

        debug!(
            %node,
            %peer,
            offered,
            learned = merged.retained,
            refreshed,
            len = set.len(),
            "gossip exchange"
        );

        StepOutcome::Exchanged {
            peer,
            learned: merged.retained,
            refreshed,
        }
    }
}
