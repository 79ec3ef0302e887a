pub mod traits;
pub mod simulator;
pub mod workloads;
pub mod space;
pub mod fitness;
pub mod genetic;
pub mod grid;
pub mod output;
pub mod manager;

pub use manager::AppConfig;
pub use simulator::SimulatorConfig;
pub use workloads::WorkloadsConfig;
pub use space::SpaceConfig;
pub use fitness::FitnessConfig;
pub use genetic::GeneticConfig;
pub use grid::GridConfig;
pub use output::OutputConfig;
pub use traits::ConfigSection;
