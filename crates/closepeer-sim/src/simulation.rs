//! Cycle-driven scheduler.
//!
//! Each cycle the coordinate service ticks, every node runs one gossip step
//! (in ascending or shuffled order), and then every control runs once.

use closepeer::{EuclideanCoord, GossipNetwork, NetworkStats, NodeId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{SimulationConfig, StepOrder};
use crate::coords::CoordinateService;
use crate::error::Result;
use crate::observer::{ClosePeerObserver, Control};
use crate::sampler::RandomSampler;

/// Stream separation so placement, sampling and scheduling never share
/// random draws.
const PLACEMENT_STREAM: u64 = 0x5eed_0001;
const SAMPLING_STREAM: u64 = 0x5eed_0002;

/// What happened in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Cycle number, starting at 1.
    pub cycle: u64,
    /// Close-peer distance statistics after all steps.
    pub stats: NetworkStats,
    /// Steps that reached the closeness exchange.
    pub exchanges: usize,
    /// Mean coordinate-service error at the end of the cycle.
    pub coordinate_error: f64,
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Configuration the run used.
    pub config: SimulationConfig,
    /// One report per executed cycle.
    pub cycles: Vec<CycleReport>,
    /// Cycle at which a control halted the run, if any.
    pub halted_at: Option<u64>,
}

impl SimulationReport {
    /// Report of the last executed cycle.
    pub fn last(&self) -> Option<&CycleReport> {
        self.cycles.last()
    }
}

/// Runs close-peer discovery over a simulated population.
pub struct Simulation {
    config: SimulationConfig,
    network: GossipNetwork<EuclideanCoord>,
    sampler: RandomSampler,
    coords: CoordinateService,
    rng: StdRng,
    order: Vec<NodeId>,
    observer: ClosePeerObserver,
    controls: Vec<Box<dyn Control>>,
    cycle: u64,
}

impl Simulation {
    /// Build a simulation: register and place every node.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut network = GossipNetwork::new(config.close_peer)?;
        let mut coords = CoordinateService::new(config.drift);
        let mut placement = StdRng::seed_from_u64(config.seed ^ PLACEMENT_STREAM);

        let nodes: Vec<NodeId> = (0..config.nodes as u64).map(NodeId).collect();
        for &node in &nodes {
            network.register(node);
            coords.place_random(node, config.spread, config.jitter, &mut placement);
        }

        let sampler = RandomSampler::new(nodes.clone(), config.sample_size, config.seed ^ SAMPLING_STREAM);

        info!(
            nodes = config.nodes,
            max_size = config.close_peer.max_size,
            sample_size = sampler.view_size(),
            seed = config.seed,
            "simulation ready"
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            network,
            sampler,
            coords,
            order: nodes,
            observer: ClosePeerObserver::new("closepeer.observer"),
            controls: Vec::new(),
            cycle: 0,
        })
    }

    /// Add a control to run after the built-in observer each cycle.
    pub fn add_control(&mut self, control: Box<dyn Control>) {
        self.controls.push(control);
    }

    /// The network being simulated.
    pub fn network(&self) -> &GossipNetwork<EuclideanCoord> {
        &self.network
    }

    /// The coordinate service.
    pub fn coords(&self) -> &CoordinateService {
        &self.coords
    }

    /// The built-in statistics observer.
    pub fn observer(&self) -> &ClosePeerObserver {
        &self.observer
    }

    /// Cycles executed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Run one cycle. Returns the report and whether a control asked to halt.
    pub fn run_cycle(&mut self) -> (CycleReport, bool) {
        self.cycle += 1;
        self.coords.tick();

        if self.config.order == StepOrder::Shuffled {
            self.order.shuffle(&mut self.rng);
        }

        let mut exchanges = 0;
        let mut sampler = self.sampler.resolve(&self.coords);
        for &node in &self.order {
            let outcome = self
                .network
                .step(node, &mut sampler, &self.coords, &mut self.rng);
            if outcome.exchanged() {
                exchanges += 1;
            }
        }

        let mut halt = self.observer.execute(self.cycle, &self.network);
        for control in &mut self.controls {
            halt |= control.execute(self.cycle, &self.network);
        }

        let report = CycleReport {
            cycle: self.cycle,
            stats: self.network.stats(),
            exchanges,
            coordinate_error: self.coords.mean_error(),
        };
        debug!(cycle = self.cycle, exchanges, halt, "cycle complete");

        (report, halt)
    }

    /// Run the configured number of cycles, stopping early if a control halts.
    pub fn run(&mut self) -> SimulationReport {
        let mut cycles = Vec::new();
        let mut halted_at = None;

        for _ in 0..self.config.cycles {
            let (report, halt) = self.run_cycle();
            cycles.push(report);
            if halt {
                halted_at = Some(self.cycle);
                break;
            }
        }

        if let Some(last) = cycles.last() {
            info!(cycles = cycles.len(), stats = %last.stats, "simulation finished");
        }

        SimulationReport {
            config: self.config.clone(),
            cycles,
            halted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::DistanceTarget;
    use closepeer::RefreshPolicy;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            nodes: 60,
            cycles: 15,
            sample_size: 5,
            ..Default::default()
        }
    }

    #[test]
    fn runs_configured_cycles() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let report = sim.run();

        assert_eq!(report.cycles.len(), 15);
        assert_eq!(report.halted_at, None);
        assert_eq!(sim.cycle(), 15);
        assert_eq!(sim.observer().history().len(), 15);
        assert!(report.cycles.iter().all(|c| c.stats.nodes == 60));
    }

    #[test]
    fn every_set_respects_invariants() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.run();
        for set in sim.network().sets() {
            assert!(set.check_invariants().is_ok());
            assert!(set.len() <= 10);
        }
    }

    #[test]
    fn same_seed_same_report() {
        let a = Simulation::new(small_config()).unwrap().run();
        let b = Simulation::new(small_config()).unwrap().run();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_report() {
        let a = Simulation::new(small_config()).unwrap().run();
        let b = Simulation::new(SimulationConfig {
            seed: 7,
            ..small_config()
        })
        .unwrap()
        .run();
        assert_ne!(a.cycles, b.cycles);
    }

    #[test]
    fn average_distance_shrinks_with_fixed_coordinates() {
        let config = SimulationConfig {
            nodes: 150,
            cycles: 25,
            jitter: 0.0,
            ..Default::default()
        };
        let report = Simulation::new(config).unwrap().run();

        let first = report.cycles.first().unwrap().stats.avg;
        let last = report.last().unwrap().stats.avg;
        assert!(
            last < first * 0.6,
            "average distance should shrink: first {first}, last {last}"
        );
    }

    #[test]
    fn sequential_order_with_recompute_refresh() {
        let mut config = small_config();
        config.order = StepOrder::Sequential;
        config.close_peer.refresh = RefreshPolicy::Recompute;

        let mut sim = Simulation::new(config).unwrap();
        let report = sim.run();

        assert_eq!(report.cycles.len(), 15);
        for set in sim.network().sets() {
            assert!(set.check_invariants().is_ok());
        }
    }

    #[test]
    fn every_node_exchanges_once_populated() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let (report, halt) = sim.run_cycle();
        assert!(!halt);
        assert_eq!(report.exchanges, 60);
    }

    #[test]
    fn control_can_halt() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.add_control(Box::new(DistanceTarget::new(f64::MAX)));
        let report = sim.run();
        assert_eq!(report.halted_at, Some(1));
        assert_eq!(report.cycles.len(), 1);
    }

    #[test]
    fn unbounded_cycle_count_halts_without_preallocating() {
        let mut config = small_config();
        config
            .apply_overrides(|name| {
                (name == "CLOSEPEER_CYCLES").then(|| u64::MAX.to_string())
            })
            .unwrap();
        assert!(config.validate().is_ok());

        let mut sim = Simulation::new(config).unwrap();
        sim.add_control(Box::new(DistanceTarget::new(f64::MAX)));
        let report = sim.run();

        assert_eq!(report.config.cycles, u64::MAX);
        assert_eq!(report.halted_at, Some(1));
        assert_eq!(report.cycles.len(), 1);
    }

    #[test]
    fn single_node_is_isolated() {
        let config = SimulationConfig {
            nodes: 1,
            cycles: 3,
            ..Default::default()
        };
        let report = Simulation::new(config).unwrap().run();
        let last = report.last().unwrap();
        assert_eq!(last.exchanges, 0);
        assert_eq!(last.stats.peers, 0);
        assert_eq!(last.stats.avg, 0.0);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = SimulationConfig {
            sample_size: 0,
            ..Default::default()
        };
        assert!(Simulation::new(config).is_err());
    }
}
