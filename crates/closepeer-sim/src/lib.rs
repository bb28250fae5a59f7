//! Close-Peer Simulation
//!
//! Drives close-peer discovery over a simulated population, standing in for
//! the collaborators the core only consumes.
//!
//! # Architecture
//!
//! - **CoordinateService**: true positions plus converging published estimates
//! - **RandomSampler**: rotating random views, the peer-sampling overlay
//! - **Simulation**: the cycle scheduler; steps every node, then runs controls
//! - **ClosePeerObserver**: logs distance statistics each cycle, never halts
//!
//! # Usage
//!
//! ```ignore
//! let config = SimulationConfig::from_env()?;
//! let report = Simulation::new(config)?.run();
//! println!("{}", report.last().unwrap().stats);
//! ```

mod config;
mod coords;
mod error;
mod observer;
mod sampler;
mod simulation;

pub use config::{SimulationConfig, StepOrder, CONFIG_PATH_VAR};
pub use coords::CoordinateService;
pub use error::{Result, SimError};
pub use observer::{ClosePeerObserver, Control, DistanceTarget};
pub use sampler::{RandomSampler, ResolvedSampler};
pub use simulation::{CycleReport, Simulation, SimulationReport};
