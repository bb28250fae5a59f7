//! Error types for the simulation harness.

use thiserror::Error;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur while setting up or running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Close-peer core error
    #[error("Close-peer error: {0}")]
    Core(#[from] closepeer::Error),
}
