//! Configuration for the zap planner.
//!
//! Provides the configuration structures and a loader that reads a TOML, JSON
//! or YAML file, substitutes `${VAR}` placeholders from the environment,
//! applies environment overrides and validates the result.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

impl From<zap_types::ValidationError> for ConfigError {
	fn from(err: zap_types::ValidationError) -> Self {
		ConfigError::ValidationError(err.to_string())
	}
}
