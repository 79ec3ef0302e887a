pub mod fitness;
pub mod metric;
pub mod oracle;
pub mod reference;
pub mod simulator;

pub use fitness::{improvement, FitnessEvaluator, OptimizationDirection, DEFAULT_FAILURE_PENALTY};
pub use metric::parse_roi_mpki;
pub use oracle::{sweep, Oracle};
pub use reference::{capture_baseline, evaluate_holdout, HoldoutReport, HoldoutRow, ReferenceRun};
pub use simulator::SimulatorOracle;
