//! Configuration types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zap_types::{BasketTokens, ExecutorVariant, RoundingMode};

/// Complete planner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	#[serde(default)]
	pub planner: PlannerConfig,
	pub chain: ChainConfig,
	pub aggregator: AggregatorConfig,
	/// Token tables keyed by basket name.
	pub baskets: BTreeMap<String, BasketTokens>,
}

impl Config {
	pub fn basket(&self, name: &str) -> Option<&BasketTokens> {
		self.baskets.get(name)
	}
}

/// Planning policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlannerConfig {
	/// Over-supply applied to every quoted swap input, in basis points.
	#[serde(default = "default_input_buffer_bps")]
	pub input_buffer_bps: u32,
	/// Output slippage handed to the aggregator when building swaps.
	#[serde(default = "default_slippage_percent")]
	pub slippage_percent: Decimal,
	/// Rounding direction for the basket quote.
	#[serde(default)]
	pub rounding: RoundingMode,
	/// Executor entry point the plan is serialized for.
	#[serde(default)]
	pub executor_variant: ExecutorVariant,
}

impl Default for PlannerConfig {
	fn default() -> Self {
		Self {
			input_buffer_bps: default_input_buffer_bps(),
			slippage_percent: default_slippage_percent(),
			rounding: RoundingMode::default(),
			executor_variant: ExecutorVariant::default(),
		}
	}
}

fn default_input_buffer_bps() -> u32 {
	100
}

fn default_slippage_percent() -> Decimal {
	Decimal::new(5, 1)
}

/// JSON-RPC endpoint for on-chain reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	pub rpc_url: String,
	pub chain_id: u64,
}

/// Aggregator selection and its implementation-specific table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregatorConfig {
	/// Implementation name, e.g. `oneinch`.
	pub implementation: String,
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::map::Map::new())
}
