use thiserror::Error;

#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Parameter space error: {0}")]
    Space(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Baseline error: {0}")]
    Baseline(String),

    #[error("Fitness error: {0}")]
    Fitness(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, TunerError>;
