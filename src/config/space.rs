use super::traits::ConfigSection;
use crate::engines::generation::space::{ParameterSpace, ParameterSpec};
use crate::error::TunerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    pub parameters: Vec<ParameterSpec>,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        // LLBP tunables; defaults of the reference config noted alongside
        Self {
            parameters: vec![
                ParameterSpec::power_of_two("numPatterns", 4, 64),        // 16
                ParameterSpec::power_of_two("numContexts", 1024, 8192),   // 4096
                ParameterSpec::power_of_two("ctxAssoc", 1, 16),           // 8
                ParameterSpec::power_of_two("ptrnAssoc", 1, 16),          // 4
                ParameterSpec::integer("TTWidth", 1, 32),                 // 13
                ParameterSpec::integer("CTWidth", 1, 32),                 // 14
                ParameterSpec::power_of_two("pbSize", 16, 256),           // 64
                ParameterSpec::power_of_two("pbAssoc", 1, 16),            // 4
                ParameterSpec::integer("CtrWidth", 1, 32),                // 3
                ParameterSpec::integer("ReplCtrWidth", 1, 32),            // 16
                ParameterSpec::integer("CtxReplCtrWidth", 1, 32),         // 2
            ],
        }
    }
}

impl SpaceConfig {
    pub fn space(&self) -> Result<ParameterSpace, TunerError> {
        ParameterSpace::new(self.parameters.clone())
    }
}

impl ConfigSection for SpaceConfig {
    fn section_name() -> &'static str {
        "space"
    }

    fn validate(&self) -> Result<(), TunerError> {
        self.space().map(|_| ())
    }
}
