//! Close-peer simulation binary
//!
//! Runs a seeded simulation and prints the report as JSON.

use closepeer_sim::{Simulation, SimulationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "closepeer=info,closepeer_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SimulationConfig::from_env()?;
    tracing::info!(cycles = config.cycles, "starting close-peer simulation");

    let mut simulation = Simulation::new(config)?;
    let report = simulation.run();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
