use crate::config::{ConfigSection, GridConfig};
use crate::engines::evaluation::Oracle;
use crate::engines::generation::{
    context::{Assessment, ScoredIndividual, SearchContext},
    progress::{IterationRecord, ProgressCallback},
    space::ParameterSpace,
};
use crate::error::{Result, TunerError};
use crate::types::{Individual, IndividualId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Instant;

/// Uniform sampling without replacement over `0..len`
///
/// A sparse Fisher-Yates shuffle: only displaced slots are stored, so memory
/// grows with the number of draws rather than with the grid.
#[derive(Debug, Clone)]
pub struct GridSampler {
    remaining: u64,
    displaced: HashMap<u64, u64>,
}

impl GridSampler {
    pub fn new(len: u64) -> Self {
        Self {
            remaining: len,
            displaced: HashMap::new(),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }

        let pick = rng.gen_range(0..self.remaining);
        let last = self.remaining - 1;
        let value = self.displaced.get(&pick).copied().unwrap_or(pick);
        let tail = self.displaced.remove(&last).unwrap_or(last);
        if pick != last {
            self.displaced.insert(pick, tail);
        }
        self.remaining = last;
        Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct GridOutcome {
    /// `None` when nothing beat the baseline incumbent
    pub best: Option<ScoredIndividual>,
    pub best_score: Option<f64>,
    pub grid_len: u64,
    pub iterations: usize,
    pub discarded: usize,
    pub history: Vec<IterationRecord>,
}

/// Random search over the enumerated grid with a best-so-far record
pub struct GridEngine<'a, O: Oracle + ?Sized> {
    config: GridConfig,
    space: ParameterSpace,
    context: SearchContext<'a, O>,
    rng: StdRng,
}

impl<'a, O: Oracle + ?Sized> GridEngine<'a, O> {
    pub fn new(
        config: GridConfig,
        space: ParameterSpace,
        context: SearchContext<'a, O>,
    ) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            space,
            context,
            rng,
        })
    }

    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<GridOutcome> {
        let grid_len = self.space.grid_len()?;
        let mut sampler = GridSampler::new(grid_len);
        let direction = self.context.direction();

        log::info!(
            "*** {} configurations in search grid, evaluating up to {}",
            grid_len,
            self.config.limit
        );

        let mut best: Option<ScoredIndividual> = None;
        let mut best_score = self
            .config
            .seed_with_baseline
            .then(|| self.context.evaluator().neutral_score());
        let mut history = Vec::new();
        let mut iterations = 0;
        let mut discarded = 0;
        let mut consecutive_failures = 0;

        while iterations < self.config.limit {
            let started = Instant::now();
            let Some(index) = sampler.draw(&mut self.rng) else {
                log::info!("Search grid exhausted after {} iterations", iterations);
                break;
            };

            let config = self.space.config_at(index)?;
            let individual = Individual::new(IndividualId::new(0, iterations), config);

            let scored = match self.context.assess(individual)? {
                Assessment::Scored(scored) => scored,
                Assessment::Unrunnable(failed) => {
                    discarded += 1;
                    consecutive_failures += 1;
                    if consecutive_failures > self.config.max_replacements {
                        return Err(TunerError::Search(format!(
                            "{} consecutive grid configurations failed on every trace",
                            consecutive_failures
                        )));
                    }
                    log::warn!(
                        "Simulator failed on every trace, discarding: {}",
                        failed.config
                    );
                    continue;
                }
            };
            consecutive_failures = 0;
            iterations += 1;

            let improved = best_score
                .map(|incumbent| direction.is_better(scored.score, incumbent))
                .unwrap_or(true);
            if improved {
                best_score = Some(scored.score);
                callback.on_new_best(&scored)?;
                best = Some(scored.clone());
            }

            let record = IterationRecord {
                iteration: iterations,
                score: scored.score,
                best_score: best_score.unwrap_or(scored.score),
                elapsed_secs: started.elapsed().as_secs_f64(),
            };
            callback.on_iteration_complete(&record)?;
            history.push(record);
        }

        Ok(GridOutcome {
            best,
            best_score,
            grid_len,
            iterations,
            discarded,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sampler_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sampler = GridSampler::new(50);
        let drawn: Vec<u64> = std::iter::from_fn(|| sampler.draw(&mut rng)).collect();

        assert_eq!(drawn.len(), 50);
        let unique: HashSet<u64> = drawn.iter().copied().collect();
        assert_eq!(unique, (0..50).collect());
        assert_eq!(sampler.remaining(), 0);
        assert!(sampler.draw(&mut rng).is_none());
    }

    #[test]
    fn test_sampler_handles_huge_grids_lazily() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sampler = GridSampler::new(40_000_000);
        let drawn: HashSet<u64> = (0..1000).filter_map(|_| sampler.draw(&mut rng)).collect();
        assert_eq!(drawn.len(), 1000);
        assert!(drawn.iter().all(|&i| i < 40_000_000));
        assert!(sampler.displaced.len() <= 1000);
    }

    #[test]
    fn test_sampler_single_element() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sampler = GridSampler::new(1);
        assert_eq!(sampler.draw(&mut rng), Some(0));
        assert_eq!(sampler.draw(&mut rng), None);
    }
}
