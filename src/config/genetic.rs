use super::traits::{ensure_probability, ConfigSection};
use crate::engines::evaluation::OptimizationDirection;
use crate::error::TunerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    pub elite_size: usize,
    /// Per-gene probability of a fresh draw
    pub mutation_rate: f64,
    /// Consecutive unrunnable draws tolerated for one slot
    pub max_replacements: usize,
    pub seed: Option<u64>,
    pub direction: OptimizationDirection,
    /// Memoized sweeps; 0 disables the cache
    pub cache_capacity: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 10,
            elite_size: 2,
            mutation_rate: 0.1,
            max_replacements: 10,
            seed: None,
            direction: OptimizationDirection::Minimize,
            cache_capacity: 10_000,
        }
    }
}

impl ConfigSection for GeneticConfig {
    fn section_name() -> &'static str {
        "genetic"
    }

    fn validate(&self) -> Result<(), TunerError> {
        if self.population_size == 0 {
            return Err(TunerError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.elite_size == 0 || self.elite_size > self.population_size {
            return Err(TunerError::Configuration(format!(
                "Elite size must be between 1 and the population size ({}), got {}",
                self.population_size, self.elite_size
            )));
        }
        ensure_probability(Self::section_name(), "mutation_rate", self.mutation_rate)
    }
}
