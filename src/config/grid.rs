use super::traits::ConfigSection;
use crate::engines::evaluation::OptimizationDirection;
use crate::engines::generation::space::{ParameterSpace, ParameterSpec};
use crate::error::TunerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Maximum number of evaluated configurations
    pub limit: usize,
    pub seed: Option<u64>,
    pub direction: OptimizationDirection,
    /// Start from the baseline configuration as the best-so-far
    pub seed_with_baseline: bool,
    pub max_replacements: usize,
    /// Grid-specific domains; empty means the shared `[space]`
    pub parameters: Vec<ParameterSpec>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            seed: Some(0),
            direction: OptimizationDirection::Maximize,
            seed_with_baseline: true,
            max_replacements: 10,
            parameters: vec![
                ParameterSpec::power_of_two("numPatterns", 4, 256),
                ParameterSpec::power_of_two("numContexts", 1024, 8192),
                ParameterSpec::power_of_two("ctxAssoc", 2, 16),
                ParameterSpec::power_of_two("ptrnAssoc", 2, 16),
                ParameterSpec::integer("TTWidth", 10, 14),
                ParameterSpec::integer("CTWidth", 10, 14),
                ParameterSpec::power_of_two("pbSize", 16, 128),
                ParameterSpec::power_of_two("pbAssoc", 1, 16),
                ParameterSpec::integer("CtrWidth", 1, 5),
                ParameterSpec::power_of_two("ReplCtrWidth", 1, 32),
                ParameterSpec::power_of_two("CtxReplCtrWidth", 1, 32),
            ],
        }
    }
}

impl GridConfig {
    /// Grid domains, falling back to `shared` when none are configured
    pub fn space(&self, shared: &ParameterSpace) -> Result<ParameterSpace, TunerError> {
        if self.parameters.is_empty() {
            Ok(shared.clone())
        } else {
            ParameterSpace::new(self.parameters.clone())
        }
    }
}

impl ConfigSection for GridConfig {
    fn section_name() -> &'static str {
        "grid"
    }

    fn validate(&self) -> Result<(), TunerError> {
        if self.limit == 0 {
            return Err(TunerError::Configuration(
                "grid.limit must be at least 1".to_string(),
            ));
        }
        if !self.parameters.is_empty() {
            ParameterSpace::new(self.parameters.clone())?.grid_len()?;
        }
        Ok(())
    }
}
