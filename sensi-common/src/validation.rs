//! Configuration validation for Sensi services.
//!
//! Checks that configured values are present and within valid ranges before
//! a service starts.

use thiserror::Error;

use crate::config::{Config, DevicesConfig, LlmConfig, ObservabilityConfig, ServerConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port {port} for {field}")]
    InvalidPort { port: u16, field: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            self.server.validate(),
            self.observability.validate(),
            self.devices.validate(),
            self.llm.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if self.network.bind.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "network.bind".into(),
            });
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

impl Config {
    /// Load, apply environment overrides, and validate.
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load_with_env()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: self.port,
                field: "server.port".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "server.request_timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("'{}' is not one of {:?}", self.log_level, LEVELS),
            });
        }
        if self.log_format != "json" && self.log_format != "pretty" {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("'{}' must be 'json' or 'pretty'", self.log_format),
            });
        }
        Ok(())
    }
}

impl Validate for DevicesConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !(self.fuzzy_cutoff > 0.0 && self.fuzzy_cutoff <= 1.0) {
            return Err(ValidationError::InvalidValue {
                field: "devices.fuzzy_cutoff".into(),
                reason: format!("{} is outside (0, 1]", self.fuzzy_cutoff),
            });
        }
        Ok(())
    }
}

impl Validate for LlmConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "llm.timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidValue {
                field: "llm.base_url".into(),
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "llm.model".into(),
            });
        }
        Ok(())
    }
}
