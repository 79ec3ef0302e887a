use crate::error::Result;
use crate::types::{Configuration, InstructionBudget, SimulationResult, Trace, TrialOutcome};
use rayon::prelude::*;

/// Black-box fitness oracle: one blocking trial per (configuration, trace)
///
/// Process-level problems (spawn errors, timeouts, a missing metric line) are
/// reported as [`TrialOutcome::Failed`]. The `Err` arm is reserved for fatal
/// conditions such as being unable to write the config artifact.
pub trait Oracle: Sync {
    fn run(
        &self,
        config: &Configuration,
        trace: &Trace,
        budget: InstructionBudget,
    ) -> Result<TrialOutcome>;
}

impl<F> Oracle for F
where
    F: Fn(&Configuration, &Trace, InstructionBudget) -> TrialOutcome + Sync,
{
    fn run(
        &self,
        config: &Configuration,
        trace: &Trace,
        budget: InstructionBudget,
    ) -> Result<TrialOutcome> {
        Ok(self(config, trace, budget))
    }
}

/// Run `config` against every trace
///
/// With `parallel` the trials go to the current rayon pool; the result is keyed
/// by trace, so it does not depend on completion order.
pub fn sweep<O: Oracle + ?Sized>(
    oracle: &O,
    config: &Configuration,
    traces: &[Trace],
    budget: InstructionBudget,
    parallel: bool,
) -> Result<SimulationResult> {
    let run_one = |trace: &Trace| -> Result<(Trace, TrialOutcome)> {
        let outcome = oracle.run(config, trace, budget)?;
        match &outcome {
            TrialOutcome::Metric(mpki) => {
                log::debug!("New MPKI for {}:\t{}", trace.short_name(), mpki)
            }
            TrialOutcome::Failed(reason) => log::warn!(
                "Simulator failed for trace {} ({}), with config: {}",
                trace.short_name(),
                reason,
                config
            ),
        }
        Ok((trace.clone(), outcome))
    };

    let outcomes: Vec<(Trace, TrialOutcome)> = if parallel {
        traces.par_iter().map(run_one).collect::<Result<_>>()?
    } else {
        traces.iter().map(run_one).collect::<Result<_>>()?
    };

    Ok(outcomes.into_iter().collect())
}
