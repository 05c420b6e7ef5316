//! Wires configuration into a ready planner and renders its output.

use alloy::primitives::utils::{parse_units, ParseUnits};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use zap_chain::implementations::evm::AlloyChainReader;
use zap_config::Config;
use zap_core::{ZapPlanner, ZapRequest};
use zap_types::{Address, Bytes, Call, ExecutorVariant, Plan, U256};

/// JSON document printed by `zap plan`.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
	pub basket: String,
	pub basket_token: Address,
	pub basket_amount: U256,
	pub input_token: Address,
	/// Total held asset the user must send to the executor.
	pub input_token_amount: U256,
	pub calls: Vec<Call>,
	pub executor: Address,
	pub executor_variant: ExecutorVariant,
	pub executor_payload: Bytes,
}

pub struct ZapService {
	config: Config,
	chain: Arc<AlloyChainReader>,
	planner: ZapPlanner,
}

impl ZapService {
	/// Builds the chain reader, the configured aggregator and the planner.
	pub fn new(config: Config) -> Result<Self> {
		let chain = Arc::new(
			AlloyChainReader::new(&config.chain.rpc_url, config.chain.chain_id)
				.context("Failed to create chain reader")?,
		);
		let aggregator: Arc<dyn zap_aggregator::AggregatorInterface> = Arc::from(
			zap_aggregator::create_aggregator(
				&config.aggregator.implementation,
				&config.aggregator.config,
			)
			.context("Failed to create aggregator")?,
		);

		let planner = ZapPlanner::new(chain.clone(), aggregator, config.planner.clone());
		Ok(Self {
			config,
			chain,
			planner,
		})
	}

	/// Plans a zap into `amount` of the named basket.
	pub async fn plan(
		&self,
		basket: &str,
		input_token: Address,
		amount: U256,
		user: Address,
	) -> Result<PlanOutput> {
		let tokens = self
			.config
			.basket(basket)
			.ok_or_else(|| anyhow!("Unknown basket: {}", basket))?;

		let request = ZapRequest {
			user,
			input_token,
			basket_amount: amount,
		};
		let plan = self
			.planner
			.plan(tokens, &request)
			.await
			.context("Planning failed")?;

		// Rejected requests never reach the node.
		if let Err(e) = self.chain.verify_chain_id().await {
			warn!("Chain id check failed: {}", e);
		}

		let payload = self
			.planner
			.serialize(&plan)
			.context("Failed to serialize plan")?;

		info!(basket, calls = plan.calls().len(), "Plan ready");
		Ok(render(
			basket,
			tokens.basket_token,
			tokens.executor,
			&request,
			plan,
			self.config.planner.executor_variant,
			payload,
		))
	}
}

fn render(
	basket: &str,
	basket_token: Address,
	executor: Address,
	request: &ZapRequest,
	plan: Plan,
	executor_variant: ExecutorVariant,
	executor_payload: Bytes,
) -> PlanOutput {
	PlanOutput {
		basket: basket.to_string(),
		basket_token,
		basket_amount: request.basket_amount,
		input_token: request.input_token,
		input_token_amount: plan.input_token_amount(),
		calls: plan.into_calls(),
		executor,
		executor_variant,
		executor_payload,
	}
}

/// Parses a decimal amount such as `12.5` into base units.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
	let parsed = parse_units(amount, decimals)
		.with_context(|| format!("Invalid amount: {}", amount))?;
	let value = match parsed {
		ParseUnits::U256(value) => value,
		ParseUnits::I256(_) => return Err(anyhow!("Amount must not be negative")),
	};
	if value.is_zero() {
		return Err(anyhow!("Amount must be greater than zero"));
	}
	Ok(value)
}
