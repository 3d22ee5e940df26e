pub mod models;
pub mod validation;

#[cfg(test)]
mod tests;

pub use models::{
    AppConfig, IoConfig, LogLevel, ObservabilityConfig, OutputFormat, PlannerConfig,
    RangeConfig, WindowConfig,
};
pub use validation::{ConfigValidator, ValidationUtils};

/// Configuration error type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error enumeration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<cronslot_domain::PlannerError> for ConfigError {
    fn from(err: cronslot_domain::PlannerError) -> Self {
        ConfigError::Validation(err.to_string())
    }
}
