use super::traits::ConfigSection;
use crate::engines::evaluation::DEFAULT_FAILURE_PENALTY;
use crate::error::TunerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Improvement (percent) charged for a trace whose simulation failed
    pub failure_penalty: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            failure_penalty: DEFAULT_FAILURE_PENALTY,
        }
    }
}

impl ConfigSection for FitnessConfig {
    fn section_name() -> &'static str {
        "fitness"
    }

    fn validate(&self) -> Result<(), TunerError> {
        if !self.failure_penalty.is_finite() || self.failure_penalty >= 0.0 {
            return Err(TunerError::Configuration(
                "fitness.failure_penalty must be a finite negative improvement".to_string(),
            ));
        }
        Ok(())
    }
}
