use super::traits::ConfigSection;
use crate::error::TunerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON Lines, one entry per generation
    pub genetic_progress: PathBuf,
    /// CSV, one row per grid iteration
    pub grid_progress: PathBuf,
    /// Best configuration so far, rewritten on every improvement
    pub best_config: PathBuf,
    pub holdout_report: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            genetic_progress: PathBuf::from("output/genetic_progress.jsonl"),
            grid_progress: PathBuf::from("output/grid_progress.csv"),
            best_config: PathBuf::from("output/best_config.json"),
            holdout_report: PathBuf::from("output/holdout_report.json"),
        }
    }
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), TunerError> {
        Ok(())
    }
}
