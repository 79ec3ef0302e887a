use crate::data::EvaluationCache;
use crate::engines::evaluation::{sweep, FitnessEvaluator, Oracle, OptimizationDirection};
use crate::error::Result;
use crate::types::{Individual, InstructionBudget, SimulationResult, Trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An individual together with its sweep and fitness score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIndividual {
    pub individual: Individual,
    pub results: SimulationResult,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub enum Assessment {
    Scored(ScoredIndividual),
    /// Every trace failed; the caller decides what replaces it
    Unrunnable(Individual),
}

/// Everything a driver needs to turn a configuration into a score
pub struct SearchContext<'a, O: Oracle + ?Sized> {
    oracle: &'a O,
    traces: Vec<Trace>,
    budget: InstructionBudget,
    evaluator: FitnessEvaluator,
    cache: Option<Arc<EvaluationCache>>,
    parallel: bool,
}

impl<'a, O: Oracle + ?Sized> SearchContext<'a, O> {
    pub fn new(
        oracle: &'a O,
        traces: Vec<Trace>,
        budget: InstructionBudget,
        evaluator: FitnessEvaluator,
    ) -> Result<Self> {
        evaluator.baseline().ensure_covers(&traces)?;
        Ok(Self {
            oracle,
            traces,
            budget,
            evaluator,
            cache: None,
            parallel: false,
        })
    }

    pub fn with_cache(mut self, cache: Arc<EvaluationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Run independent evaluations on the current rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn direction(&self) -> OptimizationDirection {
        self.evaluator.direction()
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    fn simulate(&self, individual: &Individual) -> Result<SimulationResult> {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&individual.config)) {
            log::debug!("[{}] served from cache", individual.id);
            return Ok(hit);
        }

        let results = sweep(
            self.oracle,
            &individual.config,
            &self.traces,
            self.budget,
            self.parallel,
        )?;

        if let Some(cache) = &self.cache {
            if !results.all_failed() {
                cache.set(individual.config.clone(), results.clone());
            }
        }
        Ok(results)
    }

    pub fn assess(&self, individual: Individual) -> Result<Assessment> {
        let results = self.simulate(&individual)?;
        if results.all_failed() {
            return Ok(Assessment::Unrunnable(individual));
        }

        let score = self.evaluator.score(&results)?;
        log::debug!("[{}] score {:.4}: {}", individual.id, score, individual.config);
        Ok(Assessment::Scored(ScoredIndividual {
            individual,
            results,
            score,
        }))
    }

    /// Assess a batch; output order follows input order
    pub fn assess_all(&self, individuals: Vec<Individual>) -> Result<Vec<Assessment>> {
        if self.parallel {
            individuals
                .into_par_iter()
                .map(|individual| self.assess(individual))
                .collect()
        } else {
            individuals
                .into_iter()
                .map(|individual| self.assess(individual))
                .collect()
        }
    }
}
