//! Runs outside the search loop: capturing the baseline before any search, and
//! checking a tuned configuration on the held-out traces afterwards.

use crate::data::Baseline;
use crate::engines::evaluation::fitness::{improvement, FitnessEvaluator};
use crate::engines::evaluation::oracle::{sweep, Oracle};
use crate::error::{Result, TunerError};
use crate::types::{Configuration, InstructionBudget, Trace, TrialOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// A set of traces simulated with one instruction budget
#[derive(Debug, Clone)]
pub struct ReferenceRun {
    pub traces: Vec<Trace>,
    pub budget: InstructionBudget,
}

/// Simulate the template configuration over every run and collect reference MPKIs
///
/// Any failed trial aborts the capture; a baseline with holes would make every
/// later score undefined.
pub fn capture_baseline<O: Oracle + ?Sized>(
    oracle: &O,
    runs: &[ReferenceRun],
    parallel: bool,
) -> Result<Baseline> {
    let defaults = Configuration::new();
    let mut values = BTreeMap::new();

    for run in runs {
        log::info!(
            "Capturing baseline for {} traces (warmup {}, simulation {})",
            run.traces.len(),
            run.budget.warmup,
            run.budget.simulation
        );
        let result = sweep(oracle, &defaults, &run.traces, run.budget, parallel)?;
        for (trace, outcome) in result.iter() {
            match outcome {
                TrialOutcome::Metric(mpki) => {
                    log::info!(" - {}:\t{}", trace.short_name(), mpki);
                    values.insert(trace.clone(), *mpki);
                }
                TrialOutcome::Failed(reason) => {
                    return Err(TunerError::Baseline(format!(
                        "Default configuration failed on {}: {}",
                        trace, reason
                    )))
                }
            }
        }
    }

    Baseline::new(values)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutRow {
    pub trace: Trace,
    pub baseline_mpki: f64,
    pub outcome: TrialOutcome,
    pub improvement: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutReport {
    pub rows: Vec<HoldoutRow>,
    pub weighted_improvement: f64,
    pub elapsed_secs: f64,
}

/// Evaluate a finished configuration on traces it was not tuned on
///
/// Failed traces are charged the evaluator's failure penalty; its direction is
/// irrelevant since the report carries the raw weighted improvement.
pub fn evaluate_holdout<O: Oracle + ?Sized>(
    oracle: &O,
    evaluator: &FitnessEvaluator,
    config: &Configuration,
    run: &ReferenceRun,
    parallel: bool,
) -> Result<HoldoutReport> {
    let baseline = evaluator.baseline();
    baseline.ensure_covers(&run.traces)?;
    let started = Instant::now();

    let result = sweep(oracle, config, &run.traces, run.budget, parallel)?;
    let weighted_improvement = evaluator.weighted_improvement(&result)?;

    let rows = result
        .iter()
        .map(|(trace, outcome)| {
            // ensure_covers above guarantees the entry
            let baseline_mpki = baseline.get(trace).unwrap_or(f64::NAN);
            HoldoutRow {
                trace: trace.clone(),
                baseline_mpki,
                outcome: outcome.clone(),
                improvement: outcome.metric().map(|mpki| improvement(baseline_mpki, mpki)),
            }
        })
        .collect();

    Ok(HoldoutReport {
        rows,
        weighted_improvement,
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}
