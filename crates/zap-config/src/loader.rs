//! Configuration loading from files and environment.

use crate::{Config, ConfigError};
use regex::Regex;
use rust_decimal::Decimal;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MAX_INPUT_BUFFER_BPS: u32 = 1_000;

/// Supported file formats, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") | None => Ok(ConfigFormat::Toml),
			Some("json") => Ok(ConfigFormat::Json),
			Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
			Some(other) => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {}",
				other
			))),
		}
	}
}

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "ZAP_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<Config, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;
		info!("Loading configuration from {:?}", file_path);

		if !tokio::fs::try_exists(file_path).await? {
			return Err(ConfigError::FileNotFound(
				file_path.to_string_lossy().to_string(),
			));
		}
		let content = tokio::fs::read_to_string(file_path).await?;

		let mut config = self.parse(&content, ConfigFormat::from_path(file_path)?)?;
		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	/// Parses configuration text after `${VAR}` substitution.
	pub fn parse(&self, content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
		let substituted = substitute_env_vars(content)?;

		match format {
			ConfigFormat::Toml => {
				toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))
			}
			ConfigFormat::Json => serde_json::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string())),
			ConfigFormat::Yaml => serde_yaml::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string())),
		}
	}

	fn apply_env_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
		if let Ok(rpc_url) = env::var(format!("{}RPC_URL", self.env_prefix)) {
			debug!("Overriding RPC URL from environment");
			config.chain.rpc_url = rpc_url;
		}

		if let Ok(base_url) = env::var(format!("{}AGGREGATOR_URL", self.env_prefix)) {
			debug!("Overriding aggregator URL from environment");
			let table = config.aggregator.config.as_table_mut().ok_or_else(|| {
				ConfigError::ValidationError("aggregator.config must be a table".to_string())
			})?;
			table.insert("base_url".to_string(), toml::Value::String(base_url));
		}

		Ok(())
	}
}

/// Replaces every `${VAR_NAME}` with the value of the environment variable.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Checks cross-field constraints serde cannot express.
pub(crate) fn validate_config(config: &Config) -> Result<(), ConfigError> {
	let planner = &config.planner;
	if planner.input_buffer_bps > MAX_INPUT_BUFFER_BPS {
		return Err(ConfigError::ValidationError(format!(
			"planner.input_buffer_bps {} exceeds {}",
			planner.input_buffer_bps, MAX_INPUT_BUFFER_BPS
		)));
	}
	if planner.slippage_percent <= Decimal::ZERO || planner.slippage_percent > Decimal::from(50) {
		return Err(ConfigError::ValidationError(format!(
			"planner.slippage_percent {} must be in (0, 50]",
			planner.slippage_percent
		)));
	}

	let rpc_url = &config.chain.rpc_url;
	if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
		return Err(ConfigError::ValidationError(
			"chain.rpc_url must start with http:// or https://".to_string(),
		));
	}
	if config.chain.chain_id == 0 {
		return Err(ConfigError::ValidationError(
			"chain.chain_id must be non-zero".to_string(),
		));
	}

	if config.aggregator.implementation.is_empty() {
		return Err(ConfigError::ValidationError(
			"aggregator.implementation must be set".to_string(),
		));
	}

	if config.baskets.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one basket must be configured".to_string(),
		));
	}
	for (name, tokens) in &config.baskets {
		tokens.validate().map_err(|e| {
			ConfigError::ValidationError(format!("basket '{}': {}", name, e))
		})?;
	}

	Ok(())
}
