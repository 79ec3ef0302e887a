//! Hyperparameter search for hardware predictors driven by an external simulator.
//!
//! A [`ParameterSpace`](engines::generation::ParameterSpace) declares the
//! tunables, an [`Oracle`](engines::evaluation::Oracle) runs the simulator for one
//! configuration and trace, the
//! [`FitnessEvaluator`](engines::evaluation::FitnessEvaluator) turns a sweep into a
//! baseline-weighted score, and either the
//! [`GeneticEngine`](engines::generation::GeneticEngine) or the
//! [`GridEngine`](engines::generation::GridEngine) decides what to try next.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use error::{Result, TunerError};
