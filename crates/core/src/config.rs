//! Run configuration
//!
//! [`CostDistanceConfig`] collects the scalar parameters of one cost-distance
//! run. It deserializes with `#[serde(default)]`, so a partial document only
//! overrides the fields it names.

use crate::error::{CostDistanceError, Result};
use crate::solver::Connectivity;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default guard on the number of rounds
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Parameters of a cost-distance run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostDistanceConfig {
    /// Largest cost propagated; `None` is unbounded
    pub max_cost: Option<f64>,
    /// Ground distance per cell; `None` estimates it from a sample tile
    pub resolution: Option<f64>,
    /// Neighborhood used by the tile kernel
    pub connectivity: Connectivity,
    /// Rounds allowed before the run fails with
    /// [`CostDistanceError::RoundLimitExceeded`]
    pub max_rounds: usize,
    /// Wall-clock budget checked after every completed round
    pub time_budget: Option<Duration>,
    /// Run tile kernels on the rayon pool
    pub parallel: bool,
}

impl Default for CostDistanceConfig {
    fn default() -> Self {
        Self {
            max_cost: None,
            resolution: None,
            connectivity: Connectivity::Four,
            max_rounds: DEFAULT_MAX_ROUNDS,
            time_budget: None,
            parallel: true,
        }
    }
}

impl CostDistanceConfig {
    /// Bound propagation to `max_cost`
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    /// Use a fixed ground resolution instead of estimating one
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Select the kernel neighborhood
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Override the round guard
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Stop after the first round that ends past `budget`
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Run every round on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Effective cost bound
    #[must_use]
    pub fn max_cost_bound(&self) -> f64 {
        self.max_cost.unwrap_or(f64::INFINITY)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`CostDistanceError::InvalidConfig`] if `max_rounds` is zero,
    /// `max_cost` is NaN, or `resolution` is not finite and positive.
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(CostDistanceError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.max_cost.is_some_and(f64::is_nan) {
            return Err(CostDistanceError::InvalidConfig(
                "max_cost must not be NaN".to_string(),
            ));
        }
        if let Some(resolution) = self.resolution {
            if !(resolution.is_finite() && resolution > 0.0) {
                return Err(CostDistanceError::InvalidConfig(format!(
                    "resolution must be finite and positive, got {resolution}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded_and_parallel() {
        let config = CostDistanceConfig::default();
        assert_eq!(config.max_cost_bound(), f64::INFINITY);
        assert!(config.parallel);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad = [
            CostDistanceConfig::default().with_max_rounds(0),
            CostDistanceConfig::default().with_max_cost(f64::NAN),
            CostDistanceConfig::default().with_resolution(0.0),
            CostDistanceConfig::default().with_resolution(f64::INFINITY),
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(CostDistanceError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_negative_max_cost_is_valid() {
        let config = CostDistanceConfig::default().with_max_cost(-1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: CostDistanceConfig =
            serde_json::from_str(r#"{ "max_cost": 250.0, "connectivity": "Eight" }"#)
                .expect("valid config document");
        assert_eq!(config.max_cost, Some(250.0));
        assert_eq!(config.connectivity, Connectivity::Eight);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert!(config.parallel);
    }
}
