use super::{
    fitness::FitnessConfig, genetic::GeneticConfig, grid::GridConfig, output::OutputConfig,
    simulator::SimulatorConfig, space::SpaceConfig, traits::ConfigSection,
    workloads::WorkloadsConfig,
};
use crate::error::TunerError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment overrides, e.g. `TUNER__GENETIC__SEED=7`
pub const ENV_PREFIX: &str = "TUNER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulator: SimulatorConfig,
    pub workloads: WorkloadsConfig,
    pub space: SpaceConfig,
    pub fitness: FitnessConfig,
    pub genetic: GeneticConfig,
    pub grid: GridConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TunerError> {
        self.simulator.validate()?;
        self.workloads.validate()?;
        self.space.validate()?;
        self.fitness.validate()?;
        self.genetic.validate()?;
        self.grid.validate()?;
        self.output.validate()?;
        Ok(())
    }

    /// Built-in defaults, then the optional file, then `TUNER__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, TunerError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            if !path.exists() {
                return Err(TunerError::Configuration(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, TunerError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TunerError> {
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| TunerError::Configuration(format!("Failed to write config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuner.toml");
        std::fs::write(
            &path,
            r#"
[genetic]
population_size = 8
elite_size = 2
seed = 42

[space]
parameters = [
    { name = "size", kind = "integer", low = 16, high = 256 },
]
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.genetic.population_size, 8);
        assert_eq!(config.genetic.seed, Some(42));
        assert_eq!(config.genetic.generations, GeneticConfig::default().generations);
        assert_eq!(config.space.parameters.len(), 1);
        assert_eq!(config.space.parameters[0].name, "size");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuner.toml");
        std::fs::write(&path, "[genetic]\nmutation_rate = 2.0\n").unwrap();

        assert!(AppConfig::load(Some(&path)).is_err());
        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let text = AppConfig::default().to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.space.parameters, AppConfig::default().space.parameters);
        assert_eq!(parsed.workloads.training, AppConfig::default().workloads.training);
    }
}
