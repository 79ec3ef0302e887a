//! Weighted fitness over per-trace simulator results
//!
//! Each successful trace contributes its percent MPKI improvement over the
//! baseline, weighted by the baseline MPKI itself, so workloads with a high
//! reference miss rate dominate. A failed trace contributes a fixed penalty with
//! weight 1.

use crate::data::Baseline;
use crate::error::{Result, TunerError};
use crate::types::SimulationResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

pub const DEFAULT_FAILURE_PENALTY: f64 = -1000.0;

/// Defines whether a score should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationDirection {
    Maximize,
    Minimize,
}

impl OptimizationDirection {
    /// Map a weighted improvement (higher is better) onto this direction's scale
    pub fn score_from_improvement(self, improvement: f64) -> f64 {
        match self {
            OptimizationDirection::Maximize => improvement,
            OptimizationDirection::Minimize => -improvement,
        }
    }

    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        self.compare(candidate, incumbent) == Ordering::Less
    }

    /// Orders scores best first; suitable for `sort_by`
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            OptimizationDirection::Maximize => ord.reverse(),
            OptimizationDirection::Minimize => ord,
        }
    }
}

/// Percent MPKI improvement; positive means fewer misses than the baseline
pub fn improvement(baseline: f64, new: f64) -> f64 {
    (baseline - new) / baseline * 100.0
}

#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    baseline: Arc<Baseline>,
    failure_penalty: f64,
    direction: OptimizationDirection,
}

impl FitnessEvaluator {
    pub fn new(baseline: Arc<Baseline>, direction: OptimizationDirection) -> Self {
        Self {
            baseline,
            failure_penalty: DEFAULT_FAILURE_PENALTY,
            direction,
        }
    }

    pub fn with_failure_penalty(mut self, penalty: f64) -> Self {
        self.failure_penalty = penalty;
        self
    }

    pub fn direction(&self) -> OptimizationDirection {
        self.direction
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Score of the baseline configuration itself
    pub fn neutral_score(&self) -> f64 {
        self.direction.score_from_improvement(0.0)
    }

    /// Baseline-weighted average improvement across traces
    pub fn weighted_improvement(&self, result: &SimulationResult) -> Result<f64> {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for (trace, outcome) in result.iter() {
            let baseline = self.baseline.get(trace).ok_or_else(|| {
                TunerError::Fitness(format!("No baseline MPKI for trace {}", trace))
            })?;
            if !(baseline > 0.0 && baseline.is_finite()) {
                return Err(TunerError::Fitness(format!(
                    "Baseline MPKI for trace {} must be positive, got {}",
                    trace, baseline
                )));
            }

            let (trace_improvement, weight) = match outcome.metric() {
                Some(mpki) => (improvement(baseline, mpki), baseline),
                None => (self.failure_penalty, 1.0),
            };

            log::debug!(
                " - {}:\t{:.4}% diff (weight {})",
                trace.short_name(),
                trace_improvement,
                weight
            );

            weighted_sum += trace_improvement * weight;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return Err(TunerError::Fitness(
                "Total weight is zero; no traces were evaluated".to_string(),
            ));
        }

        let average = weighted_sum / total_weight;
        if !average.is_finite() {
            return Err(TunerError::Fitness(format!(
                "Weighted improvement is not finite ({})",
                average
            )));
        }
        Ok(average)
    }

    /// Fitness score under this evaluator's direction
    pub fn score(&self, result: &SimulationResult) -> Result<f64> {
        Ok(self
            .direction
            .score_from_improvement(self.weighted_improvement(result)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Trace, TrialFailure, TrialOutcome};

    fn baseline(entries: &[(&str, f64)]) -> Arc<Baseline> {
        Arc::new(
            Baseline::new(entries.iter().map(|(t, v)| (Trace::new(*t), *v)).collect()).unwrap(),
        )
    }

    fn result(entries: &[(&str, TrialOutcome)]) -> SimulationResult {
        entries
            .iter()
            .map(|(t, o)| (Trace::new(*t), o.clone()))
            .collect()
    }

    #[test]
    fn test_improvement_formula() {
        assert!((improvement(10.0, 8.0) - 20.0).abs() < 1e-12);
        assert_eq!(improvement(5.0, 5.0), 0.0);
        assert!((improvement(4.0, 5.0) + 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_by_baseline() {
        let evaluator = FitnessEvaluator::new(
            baseline(&[("a", 10.0), ("b", 30.0)]),
            OptimizationDirection::Maximize,
        );
        // a: +20% (weight 10), b: 0% (weight 30)
        let res = result(&[
            ("a", TrialOutcome::Metric(8.0)),
            ("b", TrialOutcome::Metric(30.0)),
        ]);
        let score = evaluator.score(&res).unwrap();
        assert!((score - 200.0 / 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_failed_trace_contributes_penalty() {
        let evaluator = FitnessEvaluator::new(
            baseline(&[("a", 10.0), ("b", 30.0)]),
            OptimizationDirection::Maximize,
        );
        let expected = (20.0 * 10.0 + DEFAULT_FAILURE_PENALTY * 1.0) / 11.0;

        for other in [8.0, 1.0, 50.0] {
            let res = result(&[
                ("a", TrialOutcome::Metric(other)),
                ("b", TrialOutcome::Failed(TrialFailure::Timeout)),
            ]);
            let score = evaluator.score(&res).unwrap();
            let a_part = improvement(10.0, other) * 10.0;
            assert!((score - (a_part + DEFAULT_FAILURE_PENALTY) / 11.0).abs() < 1e-9);
        }

        let res = result(&[
            ("a", TrialOutcome::Metric(8.0)),
            ("b", TrialOutcome::Failed(TrialFailure::MissingMetric)),
        ]);
        assert!((evaluator.score(&res).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_all_failed_scores_exactly_the_penalty() {
        let evaluator = FitnessEvaluator::new(baseline(&[("a", 3.0), ("b", 7.0)]), OptimizationDirection::Maximize)
            .with_failure_penalty(-500.0);
        let res = result(&[
            ("a", TrialOutcome::Failed(TrialFailure::Timeout)),
            ("b", TrialOutcome::Failed(TrialFailure::MissingMetric)),
        ]);
        assert_eq!(evaluator.score(&res).unwrap(), -500.0);
    }

    #[test]
    fn test_minimize_negates_score() {
        let base = baseline(&[("a", 10.0)]);
        let res = result(&[("a", TrialOutcome::Metric(8.0))]);
        let max = FitnessEvaluator::new(base.clone(), OptimizationDirection::Maximize);
        let min = FitnessEvaluator::new(base, OptimizationDirection::Minimize);
        assert!((max.score(&res).unwrap() - 20.0).abs() < 1e-12);
        assert!((min.score(&res).unwrap() + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_baseline_is_fatal() {
        let evaluator = FitnessEvaluator::new(baseline(&[("a", 10.0)]), OptimizationDirection::Minimize);
        let res = result(&[("unknown", TrialOutcome::Metric(1.0))]);
        assert!(matches!(evaluator.score(&res), Err(TunerError::Fitness(_))));
    }

    #[test]
    fn test_empty_result_is_fatal() {
        let evaluator = FitnessEvaluator::new(baseline(&[("a", 10.0)]), OptimizationDirection::Minimize);
        assert!(matches!(
            evaluator.score(&SimulationResult::new()),
            Err(TunerError::Fitness(_))
        ));
    }

    #[test]
    fn test_direction_ordering() {
        let max = OptimizationDirection::Maximize;
        let min = OptimizationDirection::Minimize;
        assert!(max.is_better(2.0, 1.0));
        assert!(!max.is_better(1.0, 1.0));
        assert!(min.is_better(1.0, 2.0));

        let mut scores = vec![3.0, -1.0, 7.0];
        scores.sort_by(|a, b| max.compare(*a, *b));
        assert_eq!(scores, vec![7.0, 3.0, -1.0]);
        scores.sort_by(|a, b| min.compare(*a, *b));
        assert_eq!(scores, vec![-1.0, 3.0, 7.0]);
    }
}
