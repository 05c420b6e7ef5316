//! Swap aggregator access for the zap planner.
//!
//! The planner prices each precursor leg and obtains executable swap calldata
//! through [`AggregatorInterface`]. Implementations are selected by name from
//! configuration, so alternate providers can be substituted without touching
//! the planner.

use async_trait::async_trait;
use thiserror::Error;
use zap_types::{Address, SwapCall, SwapRequest, TradeQuote, U256};

pub mod implementations {
	pub mod oneinch;
}

/// Errors that can occur while talking to an aggregator.
#[derive(Debug, Error)]
pub enum AggregatorError {
	/// The request could not be sent or the connection failed.
	#[error("HTTP error: {0}")]
	Http(String),
	/// The aggregator answered with an error body or a failing status.
	#[error("Aggregator returned error (status {status}): {message}")]
	Api { status: u16, message: String },
	/// The response did not have the expected shape.
	#[error("Failed to decode response: {0}")]
	Decode(String),
	/// The aggregator returned no executable transaction.
	#[error("No route available: {0}")]
	NoRoute(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Config(String),
}

impl From<zap_types::ValidationError> for AggregatorError {
	fn from(err: zap_types::ValidationError) -> Self {
		AggregatorError::Config(err.to_string())
	}
}

/// Price and route provider.
#[async_trait]
pub trait AggregatorInterface: Send + Sync {
	/// How much `token_in` is needed to receive `amount_out` of `token_out`.
	async fn quote(
		&self,
		token_in: Address,
		token_out: Address,
		amount_out: U256,
	) -> Result<TradeQuote, AggregatorError>;

	/// Builds calldata selling exactly `request.amount_in` of `request.token_in`,
	/// with proceeds sent to `request.destination`.
	async fn build_swap(&self, request: &SwapRequest) -> Result<SwapCall, AggregatorError>;
}

/// Constructor for an aggregator implementation from its config table.
pub type AggregatorFactory = fn(&toml::Value) -> Result<Box<dyn AggregatorInterface>, AggregatorError>;

/// Every aggregator implementation known to this crate.
pub fn get_all_implementations() -> Vec<(&'static str, AggregatorFactory)> {
	vec![("oneinch", implementations::oneinch::create_aggregator)]
}

/// Builds the named implementation, validating its config table first.
pub fn create_aggregator(
	implementation: &str,
	config: &toml::Value,
) -> Result<Box<dyn AggregatorInterface>, AggregatorError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == implementation)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			AggregatorError::Config(format!("Unknown aggregator implementation: {}", implementation))
		})?;

	factory(config)
}
