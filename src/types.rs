use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque workload key handed to the oracle (usually a trace file path)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(String);

impl Trace {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path component, for log lines
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameter name -> value, one entry per tunable
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, i64>);

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: i64) {
        self.0.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, value)| (name.into(), value)).collect())
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        f.write_str("}")
    }
}

/// Where an individual came from: the generation it was born in and its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndividualId {
    pub generation: usize,
    pub slot: usize,
}

impl IndividualId {
    pub fn new(generation: usize, slot: usize) -> Self {
        Self { generation, slot }
    }
}

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}/s{}", self.generation, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: IndividualId,
    pub config: Configuration,
}

impl Individual {
    pub fn new(id: IndividualId, config: Configuration) -> Self {
        Self { id, config }
    }
}

/// Warmup and ROI lengths passed to every simulator run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionBudget {
    pub warmup: u64,
    pub simulation: u64,
}

impl InstructionBudget {
    pub fn new(warmup: u64, simulation: u64) -> Self {
        Self { warmup, simulation }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialFailure {
    /// The simulator process could not be started
    Spawn(String),
    /// Killed after exceeding the per-invocation timeout
    Timeout,
    /// No `ROI MPKI` line in the captured output
    MissingMetric,
    /// `ROI MPKI` line present but without a usable number
    Unparsable(String),
}

impl fmt::Display for TrialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialFailure::Spawn(reason) => write!(f, "spawn failed: {}", reason),
            TrialFailure::Timeout => f.write_str("timed out"),
            TrialFailure::MissingMetric => f.write_str("no ROI MPKI line in output"),
            TrialFailure::Unparsable(line) => write!(f, "unparsable metric line: {}", line),
        }
    }
}

/// Result of one (configuration, trace) simulator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    Metric(f64),
    Failed(TrialFailure),
}

impl TrialOutcome {
    pub fn metric(&self) -> Option<f64> {
        match self {
            TrialOutcome::Metric(value) => Some(*value),
            TrialOutcome::Failed(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TrialOutcome::Failed(_))
    }
}

/// Per-trace outcomes of one sweep over all reference traces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationResult(BTreeMap<Trace, TrialOutcome>);

impl SimulationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, trace: Trace, outcome: TrialOutcome) {
        self.0.insert(trace, outcome);
    }

    pub fn get(&self, trace: &Trace) -> Option<&TrialOutcome> {
        self.0.get(trace)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Trace, &TrialOutcome)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when not a single trace produced a metric
    pub fn all_failed(&self) -> bool {
        self.0.values().all(TrialOutcome::is_failure)
    }

    pub fn failure_count(&self) -> usize {
        self.0.values().filter(|o| o.is_failure()).count()
    }
}

impl FromIterator<(Trace, TrialOutcome)> for SimulationResult {
    fn from_iter<I: IntoIterator<Item = (Trace, TrialOutcome)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
