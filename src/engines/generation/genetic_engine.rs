use crate::config::GeneticConfig;
use crate::config::ConfigSection;
use crate::engines::evaluation::Oracle;
use crate::engines::generation::{
    context::{Assessment, ScoredIndividual, SearchContext},
    operators::{crossover, mutate, random_config},
    progress::{GenerationSummary, ProgressCallback},
    space::ParameterSpace,
};
use crate::error::{Result, TunerError};
use crate::types::{Individual, IndividualId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// What a finished genetic search hands back
#[derive(Debug, Clone)]
pub struct GeneticOutcome {
    /// Best individual of the re-scored terminal population
    pub best: ScoredIndividual,
    /// Best individual seen in any evaluation
    pub best_ever: ScoredIndividual,
    /// Terminal population, best first
    pub final_population: Vec<ScoredIndividual>,
    /// One summary per generation, then one for the final evaluation
    pub history: Vec<GenerationSummary>,
}

/// Generational GA: evaluate, keep the elites, breed the rest from the elites only
pub struct GeneticEngine<'a, O: Oracle + ?Sized> {
    config: GeneticConfig,
    space: ParameterSpace,
    context: SearchContext<'a, O>,
    rng: StdRng,
    best_ever: Option<ScoredIndividual>,
}

impl<'a, O: Oracle + ?Sized> GeneticEngine<'a, O> {
    pub fn new(
        config: GeneticConfig,
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
            best_ever: None,
        })
    }

    /// Run the evolution process
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<GeneticOutcome> {
        let mut population = self.initialize_population();
        let mut history = Vec::with_capacity(self.config.generations + 1);

        for generation in 0..self.config.generations {
            callback.on_generation_start(generation);

            let (ranked, replacements) =
                self.evaluate_population(population, generation, &mut callback)?;
            self.record_best(&ranked[0], &mut callback)?;

            let summary = self.summarize(generation, &ranked, replacements, false)?;
            callback.on_generation_complete(&summary)?;
            history.push(summary);

            let elites: Vec<Individual> = ranked
                .iter()
                .take(self.config.elite_size)
                .map(|scored| scored.individual.clone())
                .collect();
            population = self.reproduce(&elites, generation + 1);
        }

        // Final evaluation of the last bred population
        let final_generation = self.config.generations;
        let (final_population, replacements) =
            self.evaluate_population(population, final_generation, &mut callback)?;
        self.record_best(&final_population[0], &mut callback)?;

        let summary = self.summarize(final_generation, &final_population, replacements, true)?;
        callback.on_generation_complete(&summary)?;
        history.push(summary);

        let best = final_population[0].clone();
        let best_ever = self.best_ever.clone().unwrap_or_else(|| best.clone());
        log::info!(
            "Best individual after {} generations: {} with score {:.4}\n{}",
            self.config.generations,
            best.individual.id,
            best.score,
            best.individual.config
        );

        Ok(GeneticOutcome {
            best,
            best_ever,
            final_population,
            history,
        })
    }

    pub fn best_ever(&self) -> Option<&ScoredIndividual> {
        self.best_ever.as_ref()
    }

    fn initialize_population(&mut self) -> Vec<Individual> {
        (0..self.config.population_size)
            .map(|slot| {
                Individual::new(
                    IndividualId::new(0, slot),
                    random_config(&self.space, &mut self.rng),
                )
            })
            .collect()
    }

    /// Score every individual, replacing unrunnable ones; returns best first
    fn evaluate_population<C: ProgressCallback>(
        &mut self,
        population: Vec<Individual>,
        generation: usize,
        callback: &mut C,
    ) -> Result<(Vec<ScoredIndividual>, usize)> {
        let total = population.len();
        let assessments = self.context.assess_all(population)?;

        let mut scored = Vec::with_capacity(total);
        let mut replacements = 0;

        // Replacements draw from the RNG, so they happen here in slot order
        for (done, assessment) in assessments.into_iter().enumerate() {
            let mut current = assessment;
            let mut attempts = 0;
            let individual = loop {
                match current {
                    Assessment::Scored(individual) => break individual,
                    Assessment::Unrunnable(failed) => {
                        attempts += 1;
                        if attempts > self.config.max_replacements {
                            return Err(TunerError::Search(format!(
                                "Slot {} of generation {} failed on every trace {} times in a row",
                                failed.id.slot, generation, attempts
                            )));
                        }
                        log::warn!(
                            "[{}] simulator failed on every trace, drawing a replacement: {}",
                            failed.id,
                            failed.config
                        );
                        let fresh = Individual::new(failed.id, random_config(&self.space, &mut self.rng));
                        replacements += 1;
                        current = self.context.assess(fresh)?;
                    }
                }
            };
            callback.on_individual_evaluated(&individual, done + 1, total);
            scored.push(individual);
        }

        let direction = self.context.direction();
        // Stable: ties keep slot order
        scored.sort_by(|a, b| direction.compare(a.score, b.score));
        Ok((scored, replacements))
    }

    fn record_best<C: ProgressCallback>(
        &mut self,
        candidate: &ScoredIndividual,
        callback: &mut C,
    ) -> Result<()> {
        let direction = self.context.direction();
        let improved = self
            .best_ever
            .as_ref()
            .map(|best| direction.is_better(candidate.score, best.score))
            .unwrap_or(true);

        if improved {
            self.best_ever = Some(candidate.clone());
            callback.on_new_best(candidate)?;
        }
        Ok(())
    }

    fn summarize(
        &self,
        generation: usize,
        ranked: &[ScoredIndividual],
        replacements: usize,
        final_evaluation: bool,
    ) -> Result<GenerationSummary> {
        let best_ever_score = self
            .best_ever
            .as_ref()
            .map(|best| best.score)
            .ok_or_else(|| TunerError::Search("No individual has been scored".to_string()))?;
        let mean_score = ranked.iter().map(|s| s.score).sum::<f64>() / ranked.len() as f64;

        Ok(GenerationSummary {
            generation,
            timestamp: chrono::Utc::now().to_rfc3339(),
            best: ranked[0].clone(),
            best_ever_score,
            mean_score,
            replacements,
            final_evaluation,
        })
    }

    /// Elites carried unchanged, children bred from elite pairs only
    fn reproduce(&mut self, elites: &[Individual], next_generation: usize) -> Vec<Individual> {
        let mut next_population = elites.to_vec();

        while next_population.len() < self.config.population_size {
            // Elites are never empty: elite_size >= 1 and the population is non-empty
            let (Some(parent1), Some(parent2)) =
                (elites.choose(&mut self.rng), elites.choose(&mut self.rng))
            else {
                break;
            };
            let child = crossover(&self.space, &parent1.config, &parent2.config, &mut self.rng);
            let child = mutate(&self.space, &child, self.config.mutation_rate, &mut self.rng);
            let slot = next_population.len();
            next_population.push(Individual::new(IndividualId::new(next_generation, slot), child));
        }

        next_population
    }
}
