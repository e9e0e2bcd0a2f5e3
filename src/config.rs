use crate::matching::exhaustive::ExhaustiveCombination;
use crate::matching::moving_horizon::MovingHorizon;
use crate::matching::strategy::MatchingStrategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which matching policy a matcher uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Best fit over every combination of per-site choices.
    #[default]
    Exhaustive,
    /// Greedy pass over the most time-relevant offer of each site.
    MovingHorizon,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn MatchingStrategy> {
        match self {
            StrategyKind::Exhaustive => Box::new(ExhaustiveCombination),
            StrategyKind::MovingHorizon => Box::new(MovingHorizon),
        }
    }
}

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("aggregation frequency must be at least 1, got {0}")]
    InvalidFrequency(u32),
}

/// Tunables of the matching side of the engine.
///
/// # Examples
///
/// ```
/// use gridflex::config::{EngineConfig, StrategyKind};
///
/// let config = EngineConfig::from_json(r#"{ "strategy": "moving_horizon" }"#).unwrap();
/// assert_eq!(config.strategy, StrategyKind::MovingHorizon);
/// assert_eq!(config.aggregation_frequency, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: StrategyKind,
    /// Run a matching step on every n-th aggregator tick.
    pub aggregation_frequency: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Exhaustive,
            aggregation_frequency: 1,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregation_frequency == 0 {
            return Err(ConfigError::InvalidFrequency(self.aggregation_frequency));
        }
        Ok(())
    }
}
