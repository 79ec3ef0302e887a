use super::traits::ConfigSection;
use crate::error::TunerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Predictor simulator binary
    pub executable: PathBuf,
    /// JSON config the tuned values are written over; the baseline runs it as-is
    pub base_config: Option<PathBuf>,
    /// Per-invocation config artifacts and output captures live here
    pub work_dir: PathBuf,
    pub timeout_secs: u64,
    pub keep_artifacts: bool,
    /// Concurrent simulator processes; 1 reproduces the sequential reference behaviour
    pub parallelism: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("./build/predictor"),
            base_config: Some(PathBuf::from("configs/default_config.json")),
            work_dir: PathBuf::from("output/work"),
            timeout_secs: 3600,
            keep_artifacts: false,
            parallelism: 1,
        }
    }
}

impl ConfigSection for SimulatorConfig {
    fn section_name() -> &'static str {
        "simulator"
    }

    fn validate(&self) -> Result<(), TunerError> {
        if self.executable.as_os_str().is_empty() {
            return Err(TunerError::Configuration(
                "simulator.executable must be set".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(TunerError::Configuration(
                "simulator.timeout_secs must be positive".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(TunerError::Configuration(
                "simulator.parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
