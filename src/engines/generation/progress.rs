use super::context::ScoredIndividual;
use crate::data::{append_csv_row, append_json_line, write_json_atomic};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-generation summary of the genetic search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub timestamp: String,
    pub best: ScoredIndividual,
    pub best_ever_score: f64,
    pub mean_score: f64,
    pub replacements: usize,
    /// Set on the record of the re-scored terminal population
    #[serde(default)]
    pub final_evaluation: bool,
}

/// Per-iteration row of the grid search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub score: f64,
    pub best_score: f64,
    pub elapsed_secs: f64,
}

pub const ITERATION_CSV_HEADER: &str = "iteration,score,best_score,elapsed_secs";

impl IterationRecord {
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{}",
            self.iteration, self.score, self.best_score, self.elapsed_secs
        )
    }
}

/// Hooks called by both search drivers; I/O failures abort the search
pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_individual_evaluated(&mut self, _scored: &ScoredIndividual, _done: usize, _total: usize) {}

    fn on_generation_complete(&mut self, _summary: &GenerationSummary) -> Result<()> {
        Ok(())
    }

    fn on_iteration_complete(&mut self, _record: &IterationRecord) -> Result<()> {
        Ok(())
    }

    fn on_new_best(&mut self, _best: &ScoredIndividual) -> Result<()> {
        Ok(())
    }
}

/// Silent callback
impl ProgressCallback for () {}

impl<A: ProgressCallback, B: ProgressCallback> ProgressCallback for (A, B) {
    fn on_generation_start(&mut self, generation: usize) {
        self.0.on_generation_start(generation);
        self.1.on_generation_start(generation);
    }

    fn on_individual_evaluated(&mut self, scored: &ScoredIndividual, done: usize, total: usize) {
        self.0.on_individual_evaluated(scored, done, total);
        self.1.on_individual_evaluated(scored, done, total);
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary) -> Result<()> {
        self.0.on_generation_complete(summary)?;
        self.1.on_generation_complete(summary)
    }

    fn on_iteration_complete(&mut self, record: &IterationRecord) -> Result<()> {
        self.0.on_iteration_complete(record)?;
        self.1.on_iteration_complete(record)
    }

    fn on_new_best(&mut self, best: &ScoredIndividual) -> Result<()> {
        self.0.on_new_best(best)?;
        self.1.on_new_best(best)
    }
}

impl<C: ProgressCallback + ?Sized> ProgressCallback for &mut C {
    fn on_generation_start(&mut self, generation: usize) {
        (**self).on_generation_start(generation);
    }

    fn on_individual_evaluated(&mut self, scored: &ScoredIndividual, done: usize, total: usize) {
        (**self).on_individual_evaluated(scored, done, total);
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary) -> Result<()> {
        (**self).on_generation_complete(summary)
    }

    fn on_iteration_complete(&mut self, record: &IterationRecord) -> Result<()> {
        (**self).on_iteration_complete(record)
    }

    fn on_new_best(&mut self, best: &ScoredIndividual) -> Result<()> {
        (**self).on_new_best(best)
    }
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::info!("Generation {} starting...", generation);
    }

    fn on_individual_evaluated(&mut self, scored: &ScoredIndividual, done: usize, total: usize) {
        log::debug!(
            "  [{}] score {:.4} ({}/{})",
            scored.individual.id,
            scored.score,
            done,
            total
        );
        if done % 10 == 0 || done == total {
            log::info!("  Evaluated {}/{} individuals", done, total);
        }
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary) -> Result<()> {
        if summary.final_evaluation {
            log::info!(
                "Final evaluation: best score = {:.4} ({}), mean = {:.4}, best ever = {:.4}",
                summary.best.score,
                summary.best.individual.id,
                summary.mean_score,
                summary.best_ever_score
            );
            return Ok(());
        }
        log::info!(
            "Generation {}: best score = {:.4} ({}), mean = {:.4}, best ever = {:.4}",
            summary.generation,
            summary.best.score,
            summary.best.individual.id,
            summary.mean_score,
            summary.best_ever_score
        );
        Ok(())
    }

    fn on_iteration_complete(&mut self, record: &IterationRecord) -> Result<()> {
        log::info!(
            "Iteration {}: score = {:.4}, best = {:.4}, {:.2}s",
            record.iteration,
            record.score,
            record.best_score,
            record.elapsed_secs
        );
        Ok(())
    }

    fn on_new_best(&mut self, best: &ScoredIndividual) -> Result<()> {
        log::info!(
            "New best conf ({}, score {:.4}): {}",
            best.individual.id,
            best.score,
            best.individual.config
        );
        Ok(())
    }
}

/// Appends progress to disk as it happens
#[derive(Debug, Clone, Default)]
pub struct FileProgressRecorder {
    generations: Option<PathBuf>,
    iterations: Option<PathBuf>,
    best: Option<PathBuf>,
}

impl FileProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generation_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.generations = Some(path.into());
        self
    }

    pub fn with_iteration_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.iterations = Some(path.into());
        self
    }

    pub fn with_best_record(mut self, path: impl Into<PathBuf>) -> Self {
        self.best = Some(path.into());
        self
    }
}

impl ProgressCallback for FileProgressRecorder {
    fn on_generation_complete(&mut self, summary: &GenerationSummary) -> Result<()> {
        match &self.generations {
            Some(path) => append_json_line(path, summary),
            None => Ok(()),
        }
    }

    fn on_iteration_complete(&mut self, record: &IterationRecord) -> Result<()> {
        match &self.iterations {
            Some(path) => append_csv_row(path, ITERATION_CSV_HEADER, &record.to_csv_row()),
            None => Ok(()),
        }
    }

    fn on_new_best(&mut self, best: &ScoredIndividual) -> Result<()> {
        match &self.best {
            Some(path) => write_json_atomic(path, best),
            None => Ok(()),
        }
    }
}
