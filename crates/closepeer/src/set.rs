//! Per-node close-peer state.
//!
//! A `ClosePeerSet` is the bounded, distance-ordered list of peers one node
//! believes to be nearest. Between operations the list is always sorted
//! ascending by cached distance and never longer than `max_size`.

use std::collections::HashSet;

use closepeer_coord::Coordinate;
use tracing::trace;

use crate::config::{ClosePeerConfig, RefreshPolicy};
use crate::error::{Error, Result, Violation};
use crate::peer::{Candidate, NodeId, PeerRecord};

/// Counts describing what a single merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Candidates appended as new peers (before truncation).
    pub inserted: usize,
    /// Newly appended peers still present after truncation.
    pub retained: usize,
    /// Existing peers whose coordinate and distance were overwritten.
    pub refreshed: usize,
    /// Candidates naming the owner itself.
    pub skipped_self: usize,
    /// Candidates whose distance could not be measured.
    pub rejected: usize,
    /// Peers dropped by truncation.
    pub evicted: usize,
}

impl MergeOutcome {
    /// True if the merge left the membership of the set unchanged.
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.refreshed == 0 && self.evicted == 0
    }
}

/// Bounded, distance-ordered set of close peers owned by one node.
#[derive(Debug, Clone)]
pub struct ClosePeerSet<C> {
    /// The node this set belongs to.
    owner: NodeId,

    /// Owner's coordinate, bound once on the first gossip step.
    coord: Option<C>,

    /// Peers, ascending by cached distance.
    peers: Vec<PeerRecord<C>>,

    config: ClosePeerConfig,
}

impl<C> ClosePeerSet<C> {
    /// Create an empty set with no coordinate bound.
    pub fn new(owner: NodeId, config: ClosePeerConfig) -> Self {
        Self {
            owner,
            coord: None,
            peers: Vec::with_capacity(config.max_size),
            config,
        }
    }

    /// The owning node.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// The owner's cached coordinate, if bound.
    pub fn coord(&self) -> Option<&C> {
        self.coord.as_ref()
    }

    /// Check if the owner's coordinate has been bound.
    pub fn is_bound(&self) -> bool {
        self.coord.is_some()
    }

    /// Bound on the number of peers.
    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    /// All peers, closest first.
    pub fn peers(&self) -> &[PeerRecord<C>] {
        &self.peers
    }

    /// Number of peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Look up a peer by identity.
    pub fn get(&self, id: NodeId) -> Option<&PeerRecord<C>> {
        self.peers.iter().find(|p| p.id == id)
    }

    /// Check if a peer is present.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Cached distances, closest first.
    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.peers.iter().map(|p| p.distance)
    }

    /// Closest known peer.
    pub fn closest(&self) -> Option<&PeerRecord<C>> {
        self.peers.first()
    }

    /// Verify the post-merge invariants: bounded, sorted, unique, owner-free.
    pub fn check_invariants(&self) -> Result<()> {
        let violation = |violation| Error::InvariantViolation {
            owner: self.owner,
            violation,
        };

        if self.peers.len() > self.config.max_size {
            return Err(violation(Violation::Overfull {
                len: self.peers.len(),
                max_size: self.config.max_size,
            }));
        }

        for (index, pair) in self.peers.windows(2).enumerate() {
            if pair[1].distance < pair[0].distance {
                return Err(violation(Violation::Unsorted { index: index + 1 }));
            }
        }

        let mut seen = HashSet::with_capacity(self.peers.len());
        for peer in &self.peers {
            if peer.id == self.owner {
                return Err(violation(Violation::ContainsOwner));
            }
            if !seen.insert(peer.id) {
                return Err(violation(Violation::Duplicate(peer.id)));
            }
        }

        Ok(())
    }

    fn sort_and_truncate(&mut self) -> usize {
        self.peers.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        let excess = self.peers.len().saturating_sub(self.config.max_size);
        self.peers.truncate(self.config.max_size);
        excess
    }
}

impl<C: Coordinate> ClosePeerSet<C> {
    /// Bind the owner's coordinate.
    ///
    /// Only the first call has an effect; the set keeps that copy for the
    /// owner's lifetime. Returns true if this call bound it.
    pub fn bind_coord(&mut self, coord: C) -> bool {
        if self.coord.is_some() {
            return false;
        }
        self.coord = Some(coord);
        true
    }

    /// Merge candidates into the set.
    ///
    /// Per candidate, in order: the owner is skipped; a known peer gets its
    /// coordinate replaced and distance recomputed; an unknown peer is
    /// appended. The set is then sorted by distance and truncated to
    /// `max_size`. A set with no bound coordinate cannot measure anything
    /// and ignores the merge.
    pub fn merge<I>(&mut self, candidates: I) -> MergeOutcome
    where
        I: IntoIterator,
        I::Item: Into<Candidate<C>>,
    {
        let mut outcome = MergeOutcome::default();

        let Some(origin) = self.coord.as_ref() else {
            trace!(owner = %self.owner, "merge before coordinate bind, ignored");
            return outcome;
        };

        let mut added = Vec::new();
        for candidate in candidates {
            let Candidate { id, coord } = candidate.into();
            if id == self.owner {
                outcome.skipped_self += 1;
                continue;
            }

            match self.peers.iter_mut().find(|p| p.id == id) {
                Some(existing) => {
                    if existing.remeasure(coord, origin) {
                        outcome.refreshed += 1;
                    } else {
                        outcome.rejected += 1;
                    }
                }
                None => match PeerRecord::measured(id, coord, origin) {
                    Some(record) => {
                        self.peers.push(record);
                        added.push(id);
                    }
                    None => outcome.rejected += 1,
                },
            }
        }

        outcome.inserted = added.len();
        outcome.evicted = self.sort_and_truncate();
        outcome.retained = added.iter().filter(|&&id| self.contains(id)).count();
        debug_assert!(self.check_invariants().is_ok(), "merge broke set invariants");

        trace!(
            owner = %self.owner,
            inserted = outcome.inserted,
            retained = outcome.retained,
            refreshed = outcome.refreshed,
            evicted = outcome.evicted,
            len = self.peers.len(),
            "merged candidates"
        );

        outcome
    }

    /// Peers strictly closer to `requester` than this set's owner is.
    ///
    /// Each returned record carries its distance measured from `requester`.
    /// Read-only; an unbound set has nothing to offer.
    pub fn close_peers(&self, requester: &C) -> Vec<PeerRecord<C>> {
        let Some(own) = self.coord.as_ref() else {
            return Vec::new();
        };

        let threshold = requester.distance(own);
        self.peers
            .iter()
            .filter_map(|p| {
                let distance = requester.distance(&p.coord);
                (distance < threshold).then(|| PeerRecord {
                    id: p.id,
                    coord: p.coord.clone(),
                    distance,
                })
            })
            .collect()
    }

    /// Fold a fresh snapshot into the cached coordinate of one peer.
    ///
    /// Under `RefreshPolicy::Lazy` the cached distance is left alone. Under
    /// `RefreshPolicy::Recompute` it is remeasured and the set resorted.
    /// Returns false if the peer is not in the set.
    pub fn refresh_coord(&mut self, id: NodeId, fresh: &C) -> bool {
        let Some(index) = self.peers.iter().position(|p| p.id == id) else {
            return false;
        };

        self.peers[index].coord.update(fresh);

        if self.config.refresh == RefreshPolicy::Recompute {
            if let Some(origin) = self.coord.as_ref() {
                let distance = origin.distance(&self.peers[index].coord);
                if distance.is_finite() {
                    self.peers[index].distance = distance;
                }
            }
            self.sort_and_truncate();
        }

        true
    }
}
