//! Sampler configuration

use serde::{Deserialize, Serialize};

use crate::error::{OrbitalError, Result};

/// Radius of the viewing sphere point clouds are normalized into.
pub const DEFAULT_VIEW_RADIUS: f64 = 1.5;

/// Lowest margin accepted over a grid-searched density maximum.
pub const MIN_SAFETY_MARGIN: f64 = 1.2;

/// How the rejection envelope (maximum probability density) is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundStrategy {
    /// Fixed per-orbital table; fast but only validated for 1s..4f.
    Table,
    /// Grid search over radii and a θ/φ direction lattice.
    #[default]
    GridSearch,
}

impl BoundStrategy {
    pub fn from_name(value: Option<&str>) -> Self {
        match value.unwrap_or("grid").to_lowercase().as_str() {
            "table" => BoundStrategy::Table,
            _ => BoundStrategy::GridSearch,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundStrategy::Table => "table",
            BoundStrategy::GridSearch => "grid_search",
        }
    }

    /// Attempts allowed per requested point. The table bound is looser, so it
    /// accepts more often and needs a smaller cap.
    pub fn default_attempt_factor(self) -> usize {
        match self {
            BoundStrategy::Table => 1_000,
            BoundStrategy::GridSearch => 10_000,
        }
    }
}

/// Tunables for [`crate::sampler::OrbitalSampler`].
///
/// Every field has a default, so partial JSON such as `{"bound": "table"}`
/// deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub bound: BoundStrategy,
    /// Linear radial steps in the grid search
    pub search_steps: usize,
    pub safety_margin: f64,
    /// Overrides the strategy's attempts-per-point cap
    pub attempt_factor: Option<usize>,
    pub view_radius: f64,
    /// Decimal places kept in normalized coordinates; `None` keeps full precision
    pub round_decimals: Option<u32>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            bound: BoundStrategy::default(),
            search_steps: 100,
            safety_margin: MIN_SAFETY_MARGIN,
            attempt_factor: None,
            view_radius: DEFAULT_VIEW_RADIUS,
            round_decimals: Some(4),
        }
    }
}

impl SamplerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(OrbitalError::Config)
    }

    pub fn with_bound(mut self, bound: BoundStrategy) -> Self {
        self.bound = bound;
        self
    }

    pub fn attempt_factor(&self) -> usize {
        self.attempt_factor
            .unwrap_or_else(|| self.bound.default_attempt_factor())
    }

    pub fn safety_margin(&self) -> f64 {
        self.safety_margin.max(MIN_SAFETY_MARGIN)
    }

    /// Rounds half away from zero to `round_decimals` places.
    pub fn round(&self, value: f64) -> f64 {
        match self.round_decimals {
            Some(decimals) => {
                let factor = 10f64.powi(decimals as i32);
                (value * factor).round() / factor
            }
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = SamplerConfig::default();
        assert_eq!(config.bound, BoundStrategy::GridSearch);
        assert_eq!(config.search_steps, 100);
        assert_eq!(config.attempt_factor(), 10_000);
        assert_relative_eq!(config.view_radius, 1.5);
        assert_eq!(config.round_decimals, Some(4));

        let table = SamplerConfig::default().with_bound(BoundStrategy::Table);
        assert_eq!(table.attempt_factor(), 1_000);
    }

    #[test]
    fn test_bound_from_name() {
        assert_eq!(BoundStrategy::from_name(Some("TABLE")), BoundStrategy::Table);
        assert_eq!(BoundStrategy::from_name(Some("grid")), BoundStrategy::GridSearch);
        assert_eq!(BoundStrategy::from_name(Some("whatever")), BoundStrategy::GridSearch);
        assert_eq!(BoundStrategy::from_name(None), BoundStrategy::GridSearch);
    }

    #[test]
    fn test_partial_json() {
        let config = SamplerConfig::from_json(r#"{"bound": "table", "attempt_factor": 50}"#).unwrap();
        assert_eq!(config.bound, BoundStrategy::Table);
        assert_eq!(config.attempt_factor(), 50);
        assert_eq!(config.search_steps, 100);

        assert!(SamplerConfig::from_json(r#"{"bound": 3}"#).is_err());
    }

    #[test]
    fn test_safety_margin_floor() {
        let config = SamplerConfig {
            safety_margin: 1.0,
            ..SamplerConfig::default()
        };
        assert_relative_eq!(config.safety_margin(), MIN_SAFETY_MARGIN);

        let config = SamplerConfig {
            safety_margin: 2.0,
            ..SamplerConfig::default()
        };
        assert_relative_eq!(config.safety_margin(), 2.0);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        let config = SamplerConfig {
            round_decimals: Some(0),
            ..SamplerConfig::default()
        };
        assert_eq!(config.round(0.5), 1.0);
        assert_eq!(config.round(-2.5), -3.0);

        let config = SamplerConfig::default();
        assert_relative_eq!(config.round(0.123_449), 0.1234, epsilon = 1e-12);
        assert_relative_eq!(config.round(-1.000_06), -1.0001, epsilon = 1e-12);

        let exact = SamplerConfig {
            round_decimals: None,
            ..SamplerConfig::default()
        };
        assert_eq!(exact.round(0.123_456_789), 0.123_456_789);
    }
}
