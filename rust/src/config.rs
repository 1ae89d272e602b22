//! Configuration types for the shift optimizer.

use pyo3::prelude::*;
use std::str::FromStr;

use crate::models::ParseError;

/// Search effort tier, selecting the local-search iteration budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
    Strongest,
}

impl Strength {
    pub fn iterations(self) -> u32 {
        match self {
            Strength::Weak => 3_000,
            Strength::Medium => 10_000,
            Strength::Strong => 30_000,
            Strength::Strongest => 300_000,
        }
    }
}

impl FromStr for Strength {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weak" => Ok(Strength::Weak),
            "medium" => Ok(Strength::Medium),
            "strong" => Ok(Strength::Strong),
            "strongest" => Ok(Strength::Strongest),
            other => Err(ParseError::Strength(other.to_string())),
        }
    }
}

/// Settings for one optimization run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    /// Monthly days off everyone gets before personal extras
    #[pyo3(get, set)]
    pub base_off: u32,
    /// Longest run of working days before the streak penalty kicks in
    #[pyo3(get, set)]
    pub max_consecutive: u32,
    /// Search effort: "weak", "medium", "strong" or "strongest"
    #[pyo3(get, set)]
    pub strength: String,
    /// Explicit local-search iteration count, overriding `strength`
    #[pyo3(get, set)]
    pub iterations: Option<u32>,
    /// RNG seed; None draws one from system entropy
    #[pyo3(get, set)]
    pub seed: Option<u64>,
    /// Upper bound on full pipeline runs
    #[pyo3(get, set)]
    pub max_attempts: u32,
    /// Flattening passes per team
    #[pyo3(get, set)]
    pub team_flatten_attempts: u32,
    /// Flattening passes over the whole active roster
    #[pyo3(get, set)]
    pub global_flatten_attempts: u32,
    /// Iterations between progress reports and cancellation checks
    #[pyo3(get, set)]
    pub progress_interval: u32,
    /// Verbosity level: 0=silent, 1=phases, 2=moves, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            base_off: 8,
            max_consecutive: 5,
            strength: "medium".to_string(),
            iterations: None,
            seed: None,
            max_attempts: 5,
            team_flatten_attempts: 200,
            global_flatten_attempts: 500,
            progress_interval: 1_000,
            verbosity: 0,
        }
    }
}

#[pymethods]
impl OptimizerConfig {
    #[new]
    #[pyo3(signature = (
        base_off=None,
        max_consecutive=None,
        strength=None,
        iterations=None,
        seed=None,
        max_attempts=None,
        team_flatten_attempts=None,
        global_flatten_attempts=None,
        progress_interval=None,
        verbosity=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        base_off: Option<u32>,
        max_consecutive: Option<u32>,
        strength: Option<String>,
        iterations: Option<u32>,
        seed: Option<u64>,
        max_attempts: Option<u32>,
        team_flatten_attempts: Option<u32>,
        global_flatten_attempts: Option<u32>,
        progress_interval: Option<u32>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            base_off: base_off.unwrap_or(defaults.base_off),
            max_consecutive: max_consecutive.unwrap_or(defaults.max_consecutive),
            strength: strength.unwrap_or(defaults.strength),
            iterations,
            seed,
            max_attempts: max_attempts.unwrap_or(defaults.max_attempts),
            team_flatten_attempts: team_flatten_attempts
                .unwrap_or(defaults.team_flatten_attempts),
            global_flatten_attempts: global_flatten_attempts
                .unwrap_or(defaults.global_flatten_attempts),
            progress_interval: progress_interval.unwrap_or(defaults.progress_interval),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "OptimizerConfig(base_off={}, max_consecutive={}, strength={:?}, seed={:?})",
            self.base_off, self.max_consecutive, self.strength, self.seed
        )
    }
}

impl OptimizerConfig {
    /// Local-search iteration budget for this run.
    pub fn iteration_budget(&self) -> Result<u32, ParseError> {
        match self.iterations {
            Some(n) => Ok(n),
            None => Ok(self.strength.parse::<Strength>()?.iterations()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OptimizerConfig::default();
        assert_eq!(config.base_off, 8);
        assert_eq!(config.max_consecutive, 5);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.iteration_budget(), Ok(10_000));
    }

    #[test]
    fn test_strength_tiers() {
        assert_eq!("weak".parse::<Strength>().unwrap().iterations(), 3_000);
        assert_eq!("strong".parse::<Strength>().unwrap().iterations(), 30_000);
        assert_eq!(
            "strongest".parse::<Strength>().unwrap().iterations(),
            300_000
        );
    }

    #[test]
    fn test_explicit_iterations_override_strength() {
        let config = OptimizerConfig {
            strength: "not-a-tier".to_string(),
            iterations: Some(42),
            ..OptimizerConfig::default()
        };
        assert_eq!(config.iteration_budget(), Ok(42));
    }

    #[test]
    fn test_unknown_strength() {
        let config = OptimizerConfig {
            strength: "maximum".to_string(),
            ..OptimizerConfig::default()
        };
        assert_eq!(
            config.iteration_budget(),
            Err(ParseError::Strength("maximum".to_string()))
        );
    }
}
