use super::traits::ConfigSection;
use crate::error::TunerError;
use crate::types::{InstructionBudget, Trace};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadsConfig {
    pub trace_dir: PathBuf,
    pub trace_extension: String,
    /// Workloads the search is scored on
    pub training: Vec<String>,
    /// Held-out workloads for the final evaluation
    pub testing: Vec<String>,
    pub baseline_path: PathBuf,
    pub training_budget: InstructionBudget,
    pub evaluation_budget: InstructionBudget,
}

impl Default for WorkloadsConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            trace_dir: PathBuf::from("./traces"),
            trace_extension: ".champsim.trace.gz".to_string(),
            training: names(&[
                "benchbase-tpcc",
                "benchbase-twitter",
                "benchbase-wikipedia",
                "charlie.1006518",
                "dacapo-kafka",
                "dacapo-tomcat",
                "mwnginxfpm-wiki",
                "renaissance-finagle-http",
                "merced.467915",
                "whiskey.426708",
            ]),
            testing: names(&[
                "nodeapp-nodeapp",
                "dacapo-spring",
                "delta.507252",
                "renaissance-finagle-chirper",
            ]),
            baseline_path: PathBuf::from("output/baseline_mpki.json"),
            training_budget: InstructionBudget::new(10_000_000, 50_000_000),
            evaluation_budget: InstructionBudget::new(100_000_000, 200_000_000),
        }
    }
}

impl WorkloadsConfig {
    fn trace_for(&self, workload: &str) -> Trace {
        let file = format!("{}{}", workload, self.trace_extension);
        Trace::new(self.trace_dir.join(file).to_string_lossy().into_owned())
    }

    pub fn training_traces(&self) -> Vec<Trace> {
        self.training.iter().map(|w| self.trace_for(w)).collect()
    }

    pub fn testing_traces(&self) -> Vec<Trace> {
        self.testing.iter().map(|w| self.trace_for(w)).collect()
    }
}

impl ConfigSection for WorkloadsConfig {
    fn section_name() -> &'static str {
        "workloads"
    }

    fn validate(&self) -> Result<(), TunerError> {
        if self.training.is_empty() {
            return Err(TunerError::Configuration(
                "workloads.training must list at least one workload".to_string(),
            ));
        }
        for (name, budget) in [
            ("training_budget", &self.training_budget),
            ("evaluation_budget", &self.evaluation_budget),
        ] {
            if budget.simulation == 0 {
                return Err(TunerError::Configuration(format!(
                    "workloads.{}.simulation must be positive",
                    name
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
    fn test_trace_paths() {
        let config = WorkloadsConfig {
            trace_dir: PathBuf::from("traces"),
            training: vec!["dacapo-kafka".to_string()],
            ..WorkloadsConfig::default()
        };
        let traces = config.training_traces();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].short_name(), "dacapo-kafka.champsim.trace.gz");
        assert!(traces[0].as_str().starts_with("traces"));
    }
}
