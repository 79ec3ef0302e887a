//! Discrete parameter-space model for predictor tunables
//!
//! Every tunable is either a bounded integer range or the set of powers of two
//! inside a bounded range. Bounds are inclusive on both ends. A space is validated
//! once, when it is built, so every later draw and enumeration can assume a
//! non-empty domain.
//!
//! The order of specs inside a [`ParameterSpace`] is significant: random draws,
//! crossover and mutation all walk the specs in that order, which is what makes a
//! seeded search reproducible.

use crate::error::{Result, TunerError};
use crate::types::Configuration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    Integer,
    PowerOfTwo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: DomainKind,
    pub low: i64,
    pub high: i64,
}

impl ParameterSpec {
    pub fn integer(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            kind: DomainKind::Integer,
            low,
            high,
        }
    }

    pub fn power_of_two(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            kind: DomainKind::PowerOfTwo,
            low,
            high,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TunerError::Space("Parameter name must not be empty".to_string()));
        }
        if self.low > self.high {
            return Err(TunerError::Space(format!(
                "Parameter '{}' has low bound {} above high bound {}",
                self.name, self.low, self.high
            )));
        }
        if self.kind == DomainKind::PowerOfTwo && self.powers_of_two().is_empty() {
            return Err(TunerError::Space(format!(
                "Parameter '{}' has no power of two in [{}, {}]",
                self.name, self.low, self.high
            )));
        }
        Ok(())
    }

    /// Powers of two inside [low, high], ascending
    pub fn powers_of_two(&self) -> Vec<i64> {
        (0..63)
            .map(|shift| 1i64 << shift)
            .take_while(|&value| value <= self.high)
            .filter(|&value| value >= self.low)
            .collect()
    }

    /// Enumerated domain, ascending
    pub fn values(&self) -> Vec<i64> {
        match self.kind {
            DomainKind::Integer => (self.low..=self.high).collect(),
            DomainKind::PowerOfTwo => self.powers_of_two(),
        }
    }

    /// Number of legal values, without materializing them
    ///
    /// `None` only for an integer range spanning all of `i64`.
    pub fn cardinality(&self) -> Option<u64> {
        match self.kind {
            DomainKind::Integer => self.high.abs_diff(self.low).checked_add(1),
            DomainKind::PowerOfTwo => Some(self.powers_of_two().len() as u64),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        if value < self.low || value > self.high {
            return false;
        }
        match self.kind {
            DomainKind::Integer => true,
            DomainKind::PowerOfTwo => value > 0 && (value & (value - 1)) == 0,
        }
    }

    /// Value at `index` of the enumerated domain
    fn value_at(&self, index: u64) -> Result<i64> {
        let value = match self.kind {
            DomainKind::Integer => self
                .low
                .checked_add_unsigned(index)
                .filter(|&value| value <= self.high),
            DomainKind::PowerOfTwo => usize::try_from(index)
                .ok()
                .and_then(|i| self.powers_of_two().get(i).copied()),
        };
        value.ok_or_else(|| {
            TunerError::Space(format!(
                "Index {} is outside the domain of parameter '{}'",
                index, self.name
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParameterSpec>", into = "Vec<ParameterSpec>")]
pub struct ParameterSpace {
    specs: Vec<ParameterSpec>,
}

impl ParameterSpace {
    pub fn new(specs: Vec<ParameterSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(TunerError::Space("Parameter space has no parameters".to_string()));
        }

        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(TunerError::Space(format!(
                    "Parameter '{}' declared more than once",
                    spec.name
                )));
            }
        }

        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// True when the configuration has exactly one in-domain value per spec
    pub fn contains(&self, config: &Configuration) -> bool {
        config.len() == self.specs.len()
            && self.specs.iter().all(|spec| {
                config
                    .get(&spec.name)
                    .map(|value| spec.contains(value))
                    .unwrap_or(false)
            })
    }

    /// Size of the full Cartesian grid
    pub fn grid_len(&self) -> Result<u64> {
        self.specs.iter().try_fold(1u64, |acc, spec| {
            spec.cardinality()
                .and_then(|radix| acc.checked_mul(radix))
                .ok_or_else(|| TunerError::Space("Grid size overflows a 64-bit index".to_string()))
        })
    }

    /// Decode a grid index; the last parameter varies fastest
    pub fn config_at(&self, index: u64) -> Result<Configuration> {
        let len = self.grid_len()?;
        if index >= len {
            return Err(TunerError::Space(format!(
                "Grid index {} out of range (grid has {} configurations)",
                index, len
            )));
        }

        let mut remainder = index;
        let mut values = Vec::with_capacity(self.specs.len());
        for spec in self.specs.iter().rev() {
            // grid_len succeeded, so every radix fits
            let radix = spec.cardinality().unwrap_or(u64::MAX);
            values.push((spec.name.clone(), spec.value_at(remainder % radix)?));
            remainder /= radix;
        }

        Ok(values.into_iter().collect())
    }
}

impl TryFrom<Vec<ParameterSpec>> for ParameterSpace {
    type Error = TunerError;

    fn try_from(specs: Vec<ParameterSpec>) -> Result<Self> {
        Self::new(specs)
    }
}

impl From<ParameterSpace> for Vec<ParameterSpec> {
    fn from(space: ParameterSpace) -> Self {
        space.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_of_two_enumeration() {
        let spec = ParameterSpec::power_of_two("pbSize", 16, 256);
        assert_eq!(spec.values(), vec![16, 32, 64, 128, 256]);
        assert_eq!(spec.cardinality(), Some(5));

        // Bounds need not be powers themselves
        let spec = ParameterSpec::power_of_two("odd", 3, 100);
        assert_eq!(spec.values(), vec![4, 8, 16, 32, 64]);
    }

    #[test]
    fn test_power_of_two_without_candidates_is_rejected() {
        let spec = ParameterSpec::power_of_two("none", 5, 7);
        assert!(matches!(spec.validate(), Err(TunerError::Space(_))));
        assert!(ParameterSpace::new(vec![spec]).is_err());
    }

    #[test]
    fn test_malformed_spaces_are_rejected() {
        assert!(ParameterSpace::new(vec![]).is_err());
        assert!(ParameterSpace::new(vec![ParameterSpec::integer("a", 10, 1)]).is_err());
        assert!(ParameterSpace::new(vec![
            ParameterSpec::integer("a", 1, 4),
            ParameterSpec::integer("a", 1, 8),
        ])
        .is_err());
    }

    #[test]
    fn test_contains() {
        let spec = ParameterSpec::power_of_two("ctxAssoc", 1, 16);
        assert!(spec.contains(1));
        assert!(spec.contains(16));
        assert!(!spec.contains(12));
        assert!(!spec.contains(32));

        let space = ParameterSpace::new(vec![
            ParameterSpec::integer("TTWidth", 1, 32),
            spec,
        ])
        .unwrap();
        let good: Configuration = [("TTWidth", 13), ("ctxAssoc", 8)].into_iter().collect();
        let bad: Configuration = [("TTWidth", 13), ("ctxAssoc", 6)].into_iter().collect();
        let partial: Configuration = [("TTWidth", 13)].into_iter().collect();
        assert!(space.contains(&good));
        assert!(!space.contains(&bad));
        assert!(!space.contains(&partial));
    }

    #[test]
    fn test_grid_decoding_covers_every_combination() {
        let space = ParameterSpace::new(vec![
            ParameterSpec::integer("a", 1, 3),
            ParameterSpec::power_of_two("b", 2, 8),
        ])
        .unwrap();
        assert_eq!(space.grid_len().unwrap(), 9);

        let first = space.config_at(0).unwrap();
        assert_eq!(first.get("a"), Some(1));
        assert_eq!(first.get("b"), Some(2));

        // Last parameter varies fastest
        let second = space.config_at(1).unwrap();
        assert_eq!(second.get("a"), Some(1));
        assert_eq!(second.get("b"), Some(4));

        let all: HashSet<Configuration> = (0..9).map(|i| space.config_at(i).unwrap()).collect();
        assert_eq!(all.len(), 9);
        assert!(all.iter().all(|c| space.contains(c)));
        assert!(space.config_at(9).is_err());
    }

    #[test]
    fn test_extreme_integer_ranges() {
        let full = ParameterSpace::new(vec![ParameterSpec::integer("x", i64::MIN, i64::MAX)]).unwrap();
        assert!(matches!(full.grid_len(), Err(TunerError::Space(_))));
        assert!(matches!(full.config_at(0), Err(TunerError::Space(_))));

        // 2^64 - 1 values: the index no longer fits an i64 offset
        let wide =
            ParameterSpace::new(vec![ParameterSpec::integer("x", i64::MIN, i64::MAX - 1)]).unwrap();
        assert_eq!(wide.grid_len().unwrap(), u64::MAX);
        assert_eq!(wide.config_at(0).unwrap().get("x"), Some(i64::MIN));
        assert_eq!(wide.config_at(1 << 63).unwrap().get("x"), Some(0));
        assert_eq!(wide.config_at(u64::MAX - 1).unwrap().get("x"), Some(i64::MAX - 1));
        assert!(wide.config_at(u64::MAX).is_err());
    }

    #[test]
    fn test_space_deserializes_with_validation() {
        let ok: ParameterSpace = serde_json::from_str(
            r#"[{"name": "pbAssoc", "kind": "power_of_two", "low": 1, "high": 16}]"#,
        )
        .unwrap();
        assert_eq!(ok.len(), 1);

        let bad = serde_json::from_str::<ParameterSpace>(
            r#"[{"name": "x", "kind": "power_of_two", "low": 5, "high": 7}]"#,
        );
        assert!(bad.is_err());
    }
}
