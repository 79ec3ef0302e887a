use crate::error::{Result, TunerError};
use crate::types::Trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Reference MPKI per trace, captured once under the default configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Trace, f64>", into = "BTreeMap<Trace, f64>")]
pub struct Baseline {
    values: BTreeMap<Trace, f64>,
}

impl Baseline {
    pub fn new(values: BTreeMap<Trace, f64>) -> Result<Self> {
        for (trace, value) in &values {
            if !(*value > 0.0 && value.is_finite()) {
                return Err(TunerError::Baseline(format!(
                    "Baseline MPKI for {} must be strictly positive, got {}",
                    trace, value
                )));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, trace: &Trace) -> Option<f64> {
        self.values.get(trace).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Trace, f64)> {
        self.values.iter().map(|(trace, value)| (trace, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fails if any of `traces` has no reference value
    pub fn ensure_covers<'a>(&self, traces: impl IntoIterator<Item = &'a Trace>) -> Result<()> {
        let missing: Vec<&str> = traces
            .into_iter()
            .filter(|trace| !self.values.contains_key(*trace))
            .map(Trace::as_str)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TunerError::Baseline(format!(
                "No baseline MPKI for: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TunerError::Baseline(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let baseline: Baseline = serde_json::from_str(&contents)?;
        Ok(baseline)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl TryFrom<BTreeMap<Trace, f64>> for Baseline {
    type Error = TunerError;

    fn try_from(values: BTreeMap<Trace, f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Baseline> for BTreeMap<Trace, f64> {
    fn from(baseline: Baseline) -> Self {
        baseline.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_values() {
        for bad in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let values = BTreeMap::from([(Trace::new("t"), bad)]);
            assert!(matches!(Baseline::new(values), Err(TunerError::Baseline(_))));
        }
    }

    #[test]
    fn test_load_rejects_zero_entry() {
        let json = r#"{"traces/a.champsim.trace.gz": 3.2, "traces/b.champsim.trace.gz": 0.0}"#;
        assert!(serde_json::from_str::<Baseline>(json).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("baseline_mpki.json");
        let baseline = Baseline::new(BTreeMap::from([
            (Trace::new("traces/dacapo-kafka.champsim.trace.gz"), 4.25),
            (Trace::new("traces/mwnginxfpm-wiki.champsim.trace.gz"), 11.5),
        ]))
        .unwrap();

        baseline.save(&path).unwrap();
        let loaded = Baseline::load(&path).unwrap();
        assert_eq!(loaded, baseline);
    }

    #[test]
    fn test_ensure_covers() {
        let baseline = Baseline::new(BTreeMap::from([(Trace::new("a"), 1.0)])).unwrap();
        assert!(baseline.ensure_covers([&Trace::new("a")]).is_ok());
        assert!(baseline.ensure_covers([&Trace::new("a"), &Trace::new("b")]).is_err());
    }
}
