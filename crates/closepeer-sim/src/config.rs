//! Simulation configuration.
//!
//! Loaded from a JSON file named by `CLOSEPEER_CONFIG` when set, then
//! overridden field by field from individual environment variables.

use std::path::Path;
use std::str::FromStr;

use closepeer::ClosePeerConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SimError};

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_VAR: &str = "CLOSEPEER_CONFIG";

/// Order in which the scheduler steps nodes within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOrder {
    /// Ascending node id every cycle.
    Sequential,
    /// A fresh random permutation every cycle.
    #[default]
    Shuffled,
}

/// Configuration for the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for deterministic simulation
    pub seed: u64,
    /// Number of participating nodes
    pub nodes: usize,
    /// Number of cycles to run
    pub cycles: u64,
    /// Size of each node's random-peer-sampling view
    pub sample_size: usize,
    /// Side length of the square true positions are drawn from
    pub spread: f64,
    /// Initial coordinate error, as a fraction of `spread`
    pub jitter: f64,
    /// Fraction of the remaining error the coordinate service removes per cycle
    pub drift: f64,
    /// Node order within a cycle
    pub order: StepOrder,
    /// Close-peer set configuration shared by every node
    pub close_peer: ClosePeerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            nodes: 200,
            cycles: 30,
            sample_size: 8,
            spread: 1000.0,
            jitter: 0.1,
            drift: 0.25,
            order: StepOrder::Shuffled,
            close_peer: ClosePeerConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse configuration from JSON text. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply `CLOSEPEER_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CLOSEPEER_SEED") {
            self.seed = parse_var("CLOSEPEER_SEED", &v)?;
        }
        if let Some(v) = lookup("CLOSEPEER_NODES") {
            self.nodes = parse_var("CLOSEPEER_NODES", &v)?;
        }
        if let Some(v) = lookup("CLOSEPEER_CYCLES") {
            self.cycles = parse_var("CLOSEPEER_CYCLES", &v)?;
        }
        if let Some(v) = lookup("CLOSEPEER_SAMPLE_SIZE") {
            self.sample_size = parse_var("CLOSEPEER_SAMPLE_SIZE", &v)?;
        }
        if let Some(v) = lookup("CLOSEPEER_MAX_SIZE") {
            self.close_peer.max_size = parse_var("CLOSEPEER_MAX_SIZE", &v)?;
        }
        Ok(())
    }

    /// Reject configurations that cannot be simulated.
    pub fn validate(&self) -> Result<()> {
        if self.nodes == 0 {
            return Err(SimError::Config("nodes must be at least 1".to_string()));
        }
        if self.sample_size == 0 {
            return Err(SimError::Config("sample_size must be at least 1".to_string()));
        }
        if !(self.spread.is_finite() && self.spread > 0.0) {
            return Err(SimError::Config("spread must be a positive number".to_string()));
        }
        if !(0.0..=1.0).contains(&self.drift) || !(0.0..=1.0).contains(&self.jitter) {
            return Err(SimError::Config("drift and jitter must lie in [0, 1]".to_string()));
        }
        if self.sample_size >= self.nodes && self.nodes > 1 {
            warn!(
                sample_size = self.sample_size,
                nodes = self.nodes,
                "sample size covers the whole network, views will be capped"
            );
        }
        self.close_peer.validate()?;
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SimError::Config(format!("invalid value for {name}: {value:?}")))
}
