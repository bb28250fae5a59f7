//! Close-peer configuration.
//!
//! One `ClosePeerConfig` is built at configuration time and handed to every
//! set the network constructs. Nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default bound on the number of close peers a node keeps.
pub const DEFAULT_MAX_SIZE: usize = 10;

/// What happens to a peer entry when its cached coordinate is refreshed
/// after an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Update the cached coordinate only. The cached distance, and with it
    /// the sort position, stays as it was until the next merge touches the
    /// entry.
    #[default]
    Lazy,
    /// Update the cached coordinate, recompute the distance and resort.
    Recompute,
}

/// Configuration shared by every close-peer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosePeerConfig {
    /// Maximum number of close peers kept per node.
    pub max_size: usize,

    /// Distance bookkeeping on cached-coordinate refresh.
    pub refresh: RefreshPolicy,
}

impl Default for ClosePeerConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            refresh: RefreshPolicy::Lazy,
        }
    }
}

impl ClosePeerConfig {
    /// Create a config with the given bound and lazy refresh.
    pub fn new(max_size: usize) -> Result<Self> {
        let config = Self {
            max_size,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the refresh policy.
    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Reject configurations no set can honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::InvalidConfig(
                "max_size must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
