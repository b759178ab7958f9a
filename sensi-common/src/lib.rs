//! Sensi Common - Shared configuration, errors, and logging for the Sensi services.
//!
//! This crate provides:
//! - Configuration types and loading (`~/.sensi/config.json` + `SENSI_*` overrides)
//! - Configuration validation
//! - The unified service error type
//! - Logging setup and structured logging helpers

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, DevicesConfig, LlmConfig, NetworkConfig, ObservabilityConfig, PresetsConfig,
    ServerConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};

