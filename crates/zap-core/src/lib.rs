//! Zap planning engine.
//!
//! Turns "give me N of basket asset X, I hold token Y" into an ordered,
//! atomic list of executor calls: approvals, aggregator swaps into each
//! precursor, wrapper mints, basket issuance and a residual refund. The
//! planner only reads chain state and aggregator quotes; it never submits
//! anything.

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};
use zap_aggregator::AggregatorInterface;
use zap_chain::ChainInterface;
use zap_config::PlannerConfig;
use zap_types::{
	Address, BasketRequirement, BasketTokens, Bytes, Plan, TokenAmount, WrappedToken, U256,
};

pub mod approvals;
pub mod assembler;
pub mod basket;
pub mod calls;
pub mod encoding;
pub mod error;
pub mod rate;
pub mod trades;

#[cfg(test)]
mod test_utils;

pub use approvals::ApprovalPlanner;
pub use assembler::{PlanAssembler, PlanSteps};
pub use basket::BasketComposer;
pub use encoding::{serializer_for, CallSerializer, PackedCallSerializer, StructCallSerializer};
pub use error::ZapError;
pub use trades::{Trade, TradeFinder, TradeLeg};

/// One planning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZapRequest {
	/// Receives the issued basket asset and every refund.
	pub user: Address,
	/// The held asset paying for the zap.
	pub input_token: Address,
	/// Quantity of the basket asset to issue.
	pub basket_amount: U256,
}

/// A wrapped constituent to mint and the precursor it consumes.
struct MintLeg<'a> {
	wrapped: &'a WrappedToken,
	deposit: U256,
}

/// Builds zap plans for baskets described by a token table.
pub struct ZapPlanner {
	chain: Arc<dyn ChainInterface>,
	composer: BasketComposer,
	approvals: ApprovalPlanner,
	trades: TradeFinder,
	config: PlannerConfig,
}

impl ZapPlanner {
	pub fn new(
		chain: Arc<dyn ChainInterface>,
		aggregator: Arc<dyn AggregatorInterface>,
		config: PlannerConfig,
	) -> Self {
		Self {
			composer: BasketComposer::new(chain.clone()),
			approvals: ApprovalPlanner::new(chain.clone()),
			trades: TradeFinder::new(aggregator, config.input_buffer_bps, config.slippage_percent),
			chain,
			config,
		}
	}

	/// Plans a zap of `request.input_token` into `request.basket_amount` of
	/// the basket asset.
	///
	/// Either every step succeeds and a complete plan is returned, or the
	/// first failure is returned and nothing is produced.
	pub async fn plan(&self, tokens: &BasketTokens, request: &ZapRequest) -> Result<Plan, ZapError> {
		let input = request.input_token;
		if input == tokens.basket_token || tokens.is_wrapped(&input) {
			return Err(ZapError::UnsupportedInputToken(input));
		}

		info!(
			basket = %tokens.basket_token,
			input_token = %input,
			amount = %request.basket_amount,
			"Planning zap"
		);

		let requirement = self
			.composer
			.compose(tokens, request.basket_amount, self.config.rounding)
			.await?;
		let mints = self.mint_legs(tokens, &requirement).await?;

		// Precursor needs, in table order.
		let mut needs: Vec<TokenAmount> = tokens
			.precursors
			.iter()
			.map(|t| TokenAmount::new(t.address, U256::ZERO))
			.collect();
		for leg in &mints {
			add_need(&mut needs, leg.wrapped.underlying, leg.deposit)?;
		}
		for direct in &tokens.direct {
			add_need(&mut needs, *direct, requirement.quantity_of(direct))?;
		}

		let mut input_token_amount = U256::ZERO;
		let mut legs = Vec::new();
		for need in needs {
			if need.amount.is_zero() {
				continue;
			}
			if need.token == input {
				// Already held: no swap and no buffer.
				input_token_amount = checked_sum(input_token_amount, need.amount)?;
			} else {
				legs.push(TradeLeg {
					token_out: need.token,
					amount_out: need.amount,
				});
			}
		}

		let trades = self
			.trades
			.find(input, request.user, tokens.executor, &legs)
			.await?;
		for trade in &trades {
			input_token_amount = checked_sum(input_token_amount, trade.amount_in)?;
		}

		let candidates = approval_candidates(tokens, &requirement, input, &trades, &mints);
		let approvals = self.approvals.plan(tokens.executor, &candidates).await?;
		debug!(pairs = approvals.len(), "Planned approvals");

		let steps = PlanSteps {
			approvals: (!approvals.is_empty())
				.then(|| calls::approvals_call(tokens.executor, &approvals)),
			trades: trades.iter().map(Trade::to_call).collect(),
			mints: mints
				.iter()
				.map(|leg| calls::mint_call(tokens.executor, leg.wrapped, leg.deposit))
				.collect(),
			issuance: calls::issuance_call(tokens.basket_token, request.user, request.basket_amount),
			refund: calls::refund_call(tokens.executor, refund_tokens(tokens, input), request.user),
		};
		let plan = PlanAssembler::assemble(input_token_amount, steps);

		info!(
			calls = plan.calls().len(),
			input_token_amount = %plan.input_token_amount(),
			"Zap planned"
		);
		Ok(plan)
	}

	/// Serializes `plan` for the configured executor entry point.
	pub fn serialize(&self, plan: &Plan) -> Result<Bytes, ZapError> {
		serializer_for(self.config.executor_variant).serialize(plan.calls())
	}

	/// Reads the rate of every wrapped constituent the basket needs and
	/// converts its quantity into a precursor deposit. Table order.
	async fn mint_legs<'a>(
		&self,
		tokens: &'a BasketTokens,
		requirement: &BasketRequirement,
	) -> Result<Vec<MintLeg<'a>>, ZapError> {
		let wanted: Vec<(&WrappedToken, U256)> = tokens
			.wrapped
			.iter()
			.map(|w| (w, requirement.quantity_of(&w.address)))
			.filter(|(_, quantity)| !quantity.is_zero())
			.collect();

		let rates = try_join_all(wanted.iter().map(|(wrapped, _)| async move {
			self.chain
				.exchange_rate(wrapped.address, wrapped.family)
				.await
				.map_err(|e| ZapError::RateReadFailure {
					token: wrapped.address,
					reason: e.to_string(),
				})
		}))
		.await?;

		wanted
			.into_iter()
			.zip(rates)
			.map(|((wrapped, quantity), rate)| -> Result<MintLeg<'a>, ZapError> {
				let deposit = rate::mint_input(wrapped.family, quantity, rate)?;
				debug!(token = %wrapped.address, %quantity, %rate, %deposit, "Mint leg");
				Ok(MintLeg { wrapped, deposit })
			})
			.collect()
	}
}

fn checked_sum(a: U256, b: U256) -> Result<U256, ZapError> {
	a.checked_add(b)
		.ok_or(ZapError::ArithmeticOverflow("input token amount"))
}

fn add_need(needs: &mut [TokenAmount], token: Address, amount: U256) -> Result<(), ZapError> {
	if let Some(need) = needs.iter_mut().find(|need| need.token == token) {
		need.amount = need
			.amount
			.checked_add(amount)
			.ok_or(ZapError::ArithmeticOverflow("precursor need"))?;
	}
	Ok(())
}

/// Every pair the plan spends through, grouped by stage: held asset to each
/// router, then every precursor to its wrapper, then every wrapped and
/// direct constituent to the basket asset.
fn approval_candidates(
	tokens: &BasketTokens,
	requirement: &BasketRequirement,
	input: Address,
	trades: &[Trade],
	mints: &[MintLeg<'_>],
) -> Vec<(Address, Address)> {
	let mut candidates: Vec<(Address, Address)> =
		trades.iter().map(|trade| (input, trade.swap.to)).collect();

	candidates.extend(
		mints
			.iter()
			.map(|leg| (leg.wrapped.underlying, leg.wrapped.address)),
	);
	candidates.extend(
		mints
			.iter()
			.map(|leg| (leg.wrapped.address, tokens.basket_token)),
	);

	for direct in &tokens.direct {
		if !requirement.quantity_of(direct).is_zero() {
			candidates.push((*direct, tokens.basket_token));
		}
	}

	candidates
}

/// The held asset followed by every intermediate token, without repeats.
fn refund_tokens(tokens: &BasketTokens, input: Address) -> Vec<Address> {
	let mut refund = vec![input];
	refund.extend(
		tokens
			.intermediate_tokens()
			.into_iter()
			.filter(|t| *t != input),
	);
	refund
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::*;
	use zap_types::{ApprovalSet, ExecutorVariant};

	fn request(input: u8) -> ZapRequest {
		ZapRequest {
			user: addr(USER),
			input_token: addr(input),
			basket_amount: U256::from(20_000_000u64),
		}
	}

	fn planner(chain: Arc<FakeChain>, aggregator: Arc<FakeAggregator>) -> ZapPlanner {
		ZapPlanner::new(chain, aggregator, PlannerConfig::default())
	}

	fn static_token(tokens: &BasketTokens) -> &WrappedToken {
		tokens.wrapped_token(&addr(SAUSDC)).unwrap()
	}

	fn compound_token(tokens: &BasketTokens) -> &WrappedToken {
		tokens.wrapped_token(&addr(CUSDT)).unwrap()
	}

	#[tokio::test]
	async fn test_full_zap_from_unrelated_asset() {
		let chain = Arc::new(FakeChain::default());
		let aggregator = Arc::new(FakeAggregator::default());
		let tokens = sample_tokens();

		let plan = planner(chain.clone(), aggregator.clone())
			.plan(&tokens, &request(DAI))
			.await
			.unwrap();

		// USDC: 10.2 (saUSDC at 1.02) + 5 direct, USDT: 5; each plus 1%
		assert_eq!(plan.input_token_amount(), U256::from(15_352_000u64 + 5_050_000u64));
		assert_eq!(
			aggregator.quotes.lock().unwrap().as_slice(),
			&[
				(addr(DAI), addr(USDC), U256::from(15_200_000u64)),
				(addr(DAI), addr(USDT), U256::from(5_000_000u64)),
			]
		);
		for swap in aggregator.swaps.lock().unwrap().iter() {
			assert_eq!(swap.user, addr(USER));
			assert_eq!(swap.destination, addr(EXECUTOR));
		}

		let calls = plan.calls();
		assert_eq!(calls.len(), 7);

		let mut expected_approvals = ApprovalSet::new();
		expected_approvals.insert(addr(DAI), addr(ROUTER));
		expected_approvals.insert(addr(USDC), addr(SAUSDC));
		expected_approvals.insert(addr(USDT), addr(CUSDT));
		expected_approvals.insert(addr(SAUSDC), addr(BASKET));
		expected_approvals.insert(addr(CUSDT), addr(BASKET));
		expected_approvals.insert(addr(USDC), addr(BASKET));
		assert_eq!(calls[0], calls::approvals_call(addr(EXECUTOR), &expected_approvals));

		assert_eq!(calls[1].target, addr(ROUTER));
		assert_eq!(calls[1].payload[..20], addr(USDC).0[..]);
		assert_eq!(calls[2].target, addr(ROUTER));
		assert_eq!(calls[2].payload[..20], addr(USDT).0[..]);

		assert_eq!(
			calls[3],
			calls::mint_call(addr(EXECUTOR), static_token(&tokens), U256::from(10_200_000u64))
		);
		assert_eq!(
			calls[4],
			calls::mint_call(addr(EXECUTOR), compound_token(&tokens), U256::from(5_000_000u64))
		);
		assert_eq!(
			calls[5],
			calls::issuance_call(addr(BASKET), addr(USER), U256::from(20_000_000u64))
		);
		assert_eq!(
			calls[6],
			calls::refund_call(
				addr(EXECUTOR),
				vec![addr(DAI), addr(USDC), addr(USDT), addr(SAUSDC), addr(CUSDT)],
				addr(USER)
			)
		);
	}

	#[tokio::test]
	async fn test_held_precursor_skips_its_swap() {
		let chain = Arc::new(FakeChain::default());
		let aggregator = Arc::new(FakeAggregator::default());

		let plan = planner(chain, aggregator.clone())
			.plan(&sample_tokens(), &request(USDC))
			.await
			.unwrap();

		// USDC need is counted unbuffered; only USDT is bought
		assert_eq!(plan.input_token_amount(), U256::from(15_200_000u64 + 5_050_000u64));
		let quotes = aggregator.quotes.lock().unwrap();
		assert_eq!(quotes.len(), 1);
		assert_eq!(quotes[0].1, addr(USDT));

		let trades = plan
			.calls()
			.iter()
			.filter(|c| c.target == addr(ROUTER))
			.count();
		assert_eq!(trades, 1);
		assert_eq!(
			plan.calls().last().unwrap(),
			&calls::refund_call(
				addr(EXECUTOR),
				vec![addr(USDC), addr(USDT), addr(SAUSDC), addr(CUSDT)],
				addr(USER)
			)
		);
	}

	#[tokio::test]
	async fn test_wrapped_or_basket_input_rejected_without_io() {
		let chain = Arc::new(FakeChain::default());
		let aggregator = Arc::new(FakeAggregator::default());
		let planner = planner(chain.clone(), aggregator.clone());

		for input in [SAUSDC, BASKET] {
			let result = planner.plan(&sample_tokens(), &request(input)).await;
			assert!(matches!(result, Err(ZapError::UnsupportedInputToken(a)) if a == addr(input)));
		}
		assert_eq!(chain.reads(), 0);
		assert!(aggregator.quotes.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_existing_allowances_drop_approval_call() {
		let mut chain = FakeChain::default();
		for (token, spender) in [
			(DAI, ROUTER),
			(USDC, SAUSDC),
			(SAUSDC, BASKET),
			(USDT, CUSDT),
			(CUSDT, BASKET),
			(USDC, BASKET),
		] {
			chain = chain.with_allowance(addr(token), addr(spender), U256::MAX);
		}

		let plan = planner(Arc::new(chain), Arc::new(FakeAggregator::default()))
			.plan(&sample_tokens(), &request(DAI))
			.await
			.unwrap();

		assert_eq!(plan.calls().len(), 6);
		assert_eq!(plan.calls()[0].target, addr(ROUTER));
	}

	#[tokio::test]
	async fn test_plans_are_deterministic() {
		let chain = Arc::new(FakeChain::default());
		let mut fake = FakeAggregator::default();
		fake.delays_ms.insert(addr(USDC), 30);
		let planner = planner(chain, Arc::new(fake));

		let first = planner.plan(&sample_tokens(), &request(DAI)).await.unwrap();
		let second = planner.plan(&sample_tokens(), &request(DAI)).await.unwrap();

		assert_eq!(first, second);
		assert_eq!(
			planner.serialize(&first).unwrap(),
			planner.serialize(&second).unwrap()
		);
	}

	#[tokio::test]
	async fn test_quote_failure_yields_no_plan() {
		let aggregator = Arc::new(FakeAggregator {
			fail_quote_for: Some(addr(USDT)),
			..Default::default()
		});
		let chain = Arc::new(FakeChain::default());

		let result = planner(chain.clone(), aggregator)
			.plan(&sample_tokens(), &request(DAI))
			.await;

		assert!(matches!(result, Err(ZapError::QuoteUnavailable { .. })));
		assert!(chain.allowance_reads.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_rate_failure_yields_no_plan() {
		let chain = Arc::new(FakeChain {
			fail_rate_for: Some(addr(CUSDT)),
			..Default::default()
		});

		let result = planner(chain, Arc::new(FakeAggregator::default()))
			.plan(&sample_tokens(), &request(DAI))
			.await;
		assert!(matches!(
			result,
			Err(ZapError::RateReadFailure { token, .. }) if token == addr(CUSDT)
		));
	}

	#[tokio::test]
	async fn test_zero_quantity_constituent_is_skipped() {
		let mut basket = sample_basket();
		basket.quantities[1] = U256::ZERO;
		let chain = Arc::new(FakeChain::default().with_basket(basket));
		let aggregator = Arc::new(FakeAggregator::default());

		let plan = planner(chain.clone(), aggregator.clone())
			.plan(&sample_tokens(), &request(DAI))
			.await
			.unwrap();

		let quotes = aggregator.quotes.lock().unwrap();
		assert_eq!(quotes.len(), 1);
		assert_eq!(quotes[0].1, addr(USDC));
		assert_eq!(chain.rate_reads.lock().unwrap().as_slice(), &[addr(SAUSDC)]);
		// approvals, one trade, one mint, issuance, refund
		assert_eq!(plan.calls().len(), 5);
	}

	#[tokio::test]
	async fn test_rounding_mode_is_forwarded() {
		let chain = Arc::new(FakeChain::default());
		let config = PlannerConfig {
			rounding: zap_types::RoundingMode::Ceil,
			executor_variant: ExecutorVariant::Structs,
			..Default::default()
		};
		let planner = ZapPlanner::new(chain.clone(), Arc::new(FakeAggregator::default()), config);

		let plan = planner.plan(&sample_tokens(), &request(DAI)).await.unwrap();
		assert_eq!(
			chain.basket_quotes.lock().unwrap()[0].1,
			zap_types::RoundingMode::Ceil
		);
		assert_eq!(
			planner.serialize(&plan).unwrap(),
			StructCallSerializer.serialize(plan.calls()).unwrap()
		);
	}
}
