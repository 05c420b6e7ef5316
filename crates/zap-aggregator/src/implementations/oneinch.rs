//! 1inch-style HTTP aggregator.
//!
//! Quotes are requested in reverse: the API is asked how much of the held
//! token selling `amount_out` of the precursor would yield, and that figure is
//! used as the input estimate. The planner buffers it before building the swap.

use crate::{AggregatorError, AggregatorInterface};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};
use zap_types::{
	Address, Bytes, ConfigSchema, Field, FieldType, Schema, SwapCall, SwapRequest, Token,
	TradeQuote, U256,
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ApiToken {
	symbol: String,
	address: Address,
	decimals: u8,
}

impl From<ApiToken> for Token {
	fn from(token: ApiToken) -> Self {
		Token {
			address: token.address,
			symbol: token.symbol,
			decimals: token.decimals,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
	from_token: ApiToken,
	to_token: ApiToken,
	to_token_amount: String,
	from_token_amount: String,
}

#[derive(Debug, Deserialize)]
struct SwapTx {
	to: Address,
	data: Bytes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
	to_token_amount: String,
	tx: Option<SwapTx>,
}

fn parse_amount(field: &str, raw: &str) -> Result<U256, AggregatorError> {
	U256::from_str_radix(raw, 10)
		.map_err(|e| AggregatorError::Decode(format!("{} '{}' is not an integer: {}", field, raw, e)))
}

/// Aggregator client speaking the 1inch v5 `quote` / `swap` API.
pub struct OneInchAggregator {
	client: reqwest::Client,
	base_url: String,
	api_key: Option<String>,
}

impl OneInchAggregator {
	pub fn new(
		base_url: impl Into<String>,
		api_key: Option<String>,
		timeout: Duration,
	) -> Result<Self, AggregatorError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| AggregatorError::Config(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			api_key,
		})
	}

	/// Sends a GET request and returns the body, turning error bodies into errors.
	async fn get_json(
		&self,
		endpoint: &str,
		params: &[(&str, String)],
	) -> Result<serde_json::Value, AggregatorError> {
		let url = format!("{}/{}", self.base_url, endpoint);
		let mut request = self.client.get(&url).query(params);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| AggregatorError::Http(format!("{} request failed: {}", endpoint, e)))?;
		let status = response.status();
		let body: serde_json::Value = response.json().await.map_err(|e| {
			AggregatorError::Decode(format!("{} response is not JSON: {}", endpoint, e))
		})?;

		if body.get("error").is_some() || !status.is_success() {
			error!(endpoint, status = status.as_u16(), body = %body, ?params, "Aggregator error response");
			return Err(AggregatorError::Api {
				status: status.as_u16(),
				message: describe_error(&body),
			});
		}

		Ok(body)
	}
}

fn describe_error(body: &serde_json::Value) -> String {
	["description", "error", "message"]
		.iter()
		.find_map(|key| body.get(*key).and_then(|v| v.as_str()))
		.map(str::to_string)
		.unwrap_or_else(|| body.to_string())
}

/// Configuration schema for the 1inch aggregator.
pub struct OneInchSchema;

impl ConfigSchema for OneInchSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), zap_types::ValidationError> {
		let schema = Schema::new(
			// Required fields
			vec![Field::new("base_url", FieldType::Url)],
			// Optional fields
			vec![
				Field::new("api_key", FieldType::String),
				Field::new(
					"timeout_secs",
					FieldType::Integer {
						min: Some(1),
						max: Some(120),
					},
				),
			],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl AggregatorInterface for OneInchAggregator {
	async fn quote(
		&self,
		token_in: Address,
		token_out: Address,
		amount_out: U256,
	) -> Result<TradeQuote, AggregatorError> {
		let params = [
			("fromTokenAddress", token_out.to_checksum(None)),
			("toTokenAddress", token_in.to_checksum(None)),
			("amount", amount_out.to_string()),
		];
		let body = self.get_json("quote", &params).await?;

		let quote: QuoteResponse = serde_json::from_value(body)
			.map_err(|e| AggregatorError::Decode(format!("quote response: {}", e)))?;

		let input_amount = parse_amount("toTokenAmount", &quote.to_token_amount)?;
		let output_amount = parse_amount("fromTokenAmount", &quote.from_token_amount)?;
		debug!(
			token_in = %token_in,
			token_out = %token_out,
			%input_amount,
			%output_amount,
			"Received quote"
		);

		Ok(TradeQuote {
			input_token: quote.to_token.into(),
			output_token: quote.from_token.into(),
			input_amount,
			output_amount,
		})
	}

	async fn build_swap(&self, request: &SwapRequest) -> Result<SwapCall, AggregatorError> {
		let params = [
			("destReceiver", request.destination.to_checksum(None)),
			("fromAddress", request.user.to_checksum(None)),
			("fromTokenAddress", request.token_in.to_checksum(None)),
			("toTokenAddress", request.token_out.to_checksum(None)),
			("amount", request.amount_in.to_string()),
			("disableEstimate", "true".to_string()),
			("slippage", request.slippage_percent.normalize().to_string()),
		];
		let body = self.get_json("swap", &params).await?;

		let swap: SwapResponse = serde_json::from_value(body)
			.map_err(|e| AggregatorError::Decode(format!("swap response: {}", e)))?;

		let tx = swap.tx.ok_or_else(|| {
			error!(token_in = %request.token_in, token_out = %request.token_out, "Swap response has no transaction");
			AggregatorError::NoRoute(format!(
				"{} -> {}",
				request.token_in, request.token_out
			))
		})?;

		Ok(SwapCall {
			to: tx.to,
			data: tx.data,
			expected_output: parse_amount("toTokenAmount", &swap.to_token_amount)?,
		})
	}
}

/// Factory function to create a 1inch aggregator from configuration.
///
/// Required configuration parameters:
/// - `base_url`: API root including version and chain, e.g. `https://api.1inch.io/v5.0/1`
///
/// Optional configuration parameters:
/// - `api_key`: Bearer token sent with every request
/// - `timeout_secs`: Per-request timeout (default: 10)
pub fn create_aggregator(
	config: &toml::Value,
) -> Result<Box<dyn AggregatorInterface>, AggregatorError> {
	OneInchSchema.validate(config)?;

	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AggregatorError::Config("base_url is required".to_string()))?;

	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.map(str::to_string);

	let timeout_secs = config
		.get("timeout_secs")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECS);

	Ok(Box::new(OneInchAggregator::new(
		base_url,
		api_key,
		Duration::from_secs(timeout_secs),
	)?))
}
