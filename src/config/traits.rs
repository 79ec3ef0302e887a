use crate::error::TunerError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), TunerError>;
}

/// Shared check for the `[0, 1]` probability fields
pub(crate) fn ensure_probability(section: &str, field: &str, value: f64) -> Result<(), TunerError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TunerError::Configuration(format!(
            "{}.{} must be between 0 and 1, got {}",
            section, field, value
        )))
    }
}
