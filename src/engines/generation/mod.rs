pub mod space;
pub mod operators;
pub mod context;
pub mod progress;
pub mod genetic_engine;
pub mod grid_engine;

pub use space::{DomainKind, ParameterSpace, ParameterSpec};
pub use operators::{crossover, mutate, random_config};
pub use context::{Assessment, ScoredIndividual, SearchContext};
pub use progress::{
    ConsoleProgressCallback, FileProgressRecorder, GenerationSummary, IterationRecord,
    ProgressCallback,
};
pub use genetic_engine::{GeneticEngine, GeneticOutcome};
pub use grid_engine::{GridEngine, GridOutcome, GridSampler};
