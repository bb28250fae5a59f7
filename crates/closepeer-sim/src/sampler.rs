//! Stand-in random-peer-sampling overlay.
//!
//! Each node holds a small view of other nodes. Every request ages the view
//! by one entry: the oldest peer is dropped and a uniformly chosen fresh one
//! appended, so over time every node sees a slowly rotating random sample of
//! the whole population.

use std::collections::{HashMap, VecDeque};

use closepeer::{Candidate, CoordinateSource, NodeId, PeerSampler};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Rotating random views over a fixed population.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    population: Vec<NodeId>,
    views: HashMap<NodeId, VecDeque<NodeId>>,
    view_size: usize,
    rng: StdRng,
}

impl RandomSampler {
    /// Create a sampler over `population`.
    ///
    /// Views hold `view_size` peers, capped at the population minus one.
    pub fn new(population: Vec<NodeId>, view_size: usize, seed: u64) -> Self {
        let view_size = view_size.min(population.len().saturating_sub(1));
        Self {
            population,
            views: HashMap::new(),
            view_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Effective view size.
    pub fn view_size(&self) -> usize {
        self.view_size
    }

    /// Current view of `node` without advancing it.
    pub fn view(&self, node: NodeId) -> Option<&VecDeque<NodeId>> {
        self.views.get(&node)
    }

    /// Advance `node`'s view by one entry and return it.
    ///
    /// The first call fills the view with distinct random peers.
    pub fn next_view(&mut self, node: NodeId) -> Vec<NodeId> {
        if self.view_size == 0 {
            return Vec::new();
        }

        let Self {
            population,
            views,
            view_size,
            rng,
        } = self;

        let view = views.entry(node).or_insert_with(|| {
            let others: Vec<NodeId> = population.iter().copied().filter(|&p| p != node).collect();
            others.choose_multiple(rng, *view_size).copied().collect()
        });

        if let Some(peer) = draw_fresh(population, node, view, rng) {
            view.pop_front();
            view.push_back(peer);
        }

        view.iter().copied().collect()
    }

    /// Pair this sampler with a coordinate source so it can serve samples.
    pub fn resolve<'a, K>(&'a mut self, coords: &'a K) -> ResolvedSampler<'a, K> {
        ResolvedSampler {
            sampler: self,
            coords,
        }
    }
}

/// Uniformly pick a peer that is neither `node` nor already in `view`.
///
/// Draws with rejection while at least half the population is eligible and
/// only scans the population when it is nearly exhausted.
fn draw_fresh<R: Rng + ?Sized>(
    population: &[NodeId],
    node: NodeId,
    view: &VecDeque<NodeId>,
    rng: &mut R,
) -> Option<NodeId> {
    let eligible = |p: &NodeId| *p != node && !view.contains(p);

    if population.len() >= 2 * (view.len() + 1) {
        loop {
            let peer = population.choose(rng)?;
            if eligible(peer) {
                return Some(*peer);
            }
        }
    }

    let fresh: Vec<NodeId> = population.iter().copied().filter(eligible).collect();
    fresh.choose(rng).copied()
}

/// A [`RandomSampler`] whose views are resolved to `(id, coordinate)`.
///
/// Peers the coordinate source cannot place are dropped from the sample.
pub struct ResolvedSampler<'a, K> {
    sampler: &'a mut RandomSampler,
    coords: &'a K,
}

impl<C, K> PeerSampler<C> for ResolvedSampler<'_, K>
where
    K: CoordinateSource<C>,
{
    fn sample(&mut self, node: NodeId) -> Vec<Candidate<C>> {
        let coords = self.coords;
        self.sampler
            .next_view(node)
            .into_iter()
            .filter_map(|id| match coords.coordinate_of(id) {
                Some(coord) => Some(Candidate::new(id, coord)),
                None => {
                    trace!(%node, peer = %id, "sampled peer has no coordinate, dropped");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CoordinateService;
    use closepeer_coord::EuclideanCoord;
    use std::collections::HashSet;

    fn population(n: u64) -> Vec<NodeId> {
        (0..n).map(NodeId).collect()
    }

    #[test]
    fn view_excludes_self_and_is_distinct() {
        let mut sampler = RandomSampler::new(population(20), 5, 1);
        for _ in 0..50 {
            let view = sampler.next_view(NodeId(3));
            assert_eq!(view.len(), 5);
            assert!(!view.contains(&NodeId(3)));
            let unique: HashSet<_> = view.iter().collect();
            assert_eq!(unique.len(), view.len());
        }
    }

    #[test]
    fn view_rotates_one_entry_per_call() {
        let mut sampler = RandomSampler::new(population(50), 4, 2);
        let first = sampler.next_view(NodeId(0));
        let second = sampler.next_view(NodeId(0));
        assert_eq!(&first[1..], &second[..3]);
    }

    #[test]
    fn view_size_capped_by_population() {
        let mut sampler = RandomSampler::new(population(3), 10, 3);
        assert_eq!(sampler.view_size(), 2);
        let view = sampler.next_view(NodeId(0));
        let ids: HashSet<_> = view.into_iter().collect();
        assert_eq!(ids, [NodeId(1), NodeId(2)].into_iter().collect());
    }

    #[test]
    fn nearly_exhausted_population_still_rotates() {
        let mut sampler = RandomSampler::new(population(5), 3, 6);
        let first = sampler.next_view(NodeId(0));
        let second = sampler.next_view(NodeId(0));

        assert_eq!(&first[1..], &second[..2]);
        assert!(!first.contains(&second[2]));
        assert_ne!(second[2], NodeId(0));
    }

    #[test]
    fn large_population_views_stay_valid() {
        let mut sampler = RandomSampler::new(population(10_000), 8, 7);
        for round in 0..200u64 {
            let node = NodeId(round % 50);
            let view = sampler.next_view(node);
            assert_eq!(view.len(), 8);
            assert!(!view.contains(&node));
            let unique: HashSet<_> = view.iter().collect();
            assert_eq!(unique.len(), 8);
        }
    }

    #[test]
    fn single_node_gets_nothing() {
        let mut sampler = RandomSampler::new(population(1), 8, 4);
        assert!(sampler.next_view(NodeId(0)).is_empty());
    }

    #[test]
    fn same_seed_same_views() {
        let mut a = RandomSampler::new(population(100), 8, 9);
        let mut b = RandomSampler::new(population(100), 8, 9);
        for i in 0..10 {
            assert_eq!(a.next_view(NodeId(i)), b.next_view(NodeId(i)));
        }
    }

    #[test]
    fn resolved_sample_drops_unplaced_peers() {
        let mut coords = CoordinateService::new(0.0);
        coords.place(NodeId(1), EuclideanCoord::new(1.0, 0.0), EuclideanCoord::new(1.0, 0.0));
        // Node 2 is never placed.

        let mut sampler = RandomSampler::new(population(3), 2, 5);
        let mut resolved = sampler.resolve(&coords);
        let sample: Vec<Candidate<EuclideanCoord>> = resolved.sample(NodeId(0));

        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].id, NodeId(1));
        assert_eq!(sample[0].coord, EuclideanCoord::new(1.0, 0.0));
    }
}
