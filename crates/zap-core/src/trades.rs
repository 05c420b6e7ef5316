//! Precursor acquisition through the aggregator.
//!
//! Quotes and swap builds for different precursors are independent, so
//! each phase fans out concurrently. Results are joined back in request
//! order, which keeps the emitted call sequence deterministic regardless of
//! which response arrives first.

use crate::ZapError;
use alloy::primitives::utils::format_units;
use futures::future::try_join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error};
use zap_aggregator::AggregatorInterface;
use zap_types::{Address, Call, SwapCall, SwapRequest, Token, TradeQuote, U256};

/// Basis-point denominator for the input buffer.
const BPS_DENOMINATOR: u64 = 10_000;

/// A precursor amount that must be bought with the held asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeLeg {
	pub token_out: Address,
	pub amount_out: U256,
}

/// A priced and routed leg, ready to be emitted as a call.
#[derive(Debug, Clone)]
pub struct Trade {
	pub leg: TradeLeg,
	pub quote: TradeQuote,
	/// Quoted input plus the buffer; the exact amount the swap sells.
	pub amount_in: U256,
	pub swap: SwapCall,
}

impl Trade {
	pub fn to_call(&self) -> Call {
		Call::new(
			self.swap.to,
			self.swap.data.clone(),
			format!(
				"Trade {} {} => {}",
				display_amount(self.amount_in, &self.quote.input_token),
				self.quote.input_token.symbol,
				self.quote.output_token.symbol
			),
		)
	}
}

fn display_amount(amount: U256, token: &Token) -> String {
	format_units(amount, token.decimals).unwrap_or_else(|_| amount.to_string())
}

/// `amount + amount * bps / 10_000`, rounding the buffer down.
pub fn apply_buffer(amount: U256, bps: u32) -> Result<U256, ZapError> {
	let buffer = amount
		.checked_mul(U256::from(bps))
		.ok_or(ZapError::ArithmeticOverflow("input buffer"))?
		/ U256::from(BPS_DENOMINATOR);
	amount
		.checked_add(buffer)
		.ok_or(ZapError::ArithmeticOverflow("input buffer"))
}

/// Drives quotes and swap builds for a set of legs.
pub struct TradeFinder {
	aggregator: Arc<dyn AggregatorInterface>,
	input_buffer_bps: u32,
	slippage_percent: Decimal,
}

impl TradeFinder {
	pub fn new(
		aggregator: Arc<dyn AggregatorInterface>,
		input_buffer_bps: u32,
		slippage_percent: Decimal,
	) -> Self {
		Self {
			aggregator,
			input_buffer_bps,
			slippage_percent,
		}
	}

	/// Prices every leg, then builds its swap selling the buffered input.
	///
	/// Swaps are placed on behalf of `user` and pay out to `executor`.
	/// Returned trades are in `legs` order. Any failing leg aborts the
	/// whole acquisition.
	pub async fn find(
		&self,
		input_token: Address,
		user: Address,
		executor: Address,
		legs: &[TradeLeg],
	) -> Result<Vec<Trade>, ZapError> {
		let quotes = try_join_all(legs.iter().map(|leg| self.quote(input_token, *leg))).await?;

		let mut priced = Vec::with_capacity(quotes.len());
		for (leg, quote) in legs.iter().zip(quotes) {
			let amount_in = apply_buffer(quote.input_amount, self.input_buffer_bps)?;
			priced.push((*leg, quote, amount_in));
		}

		let swaps = try_join_all(priced.iter().map(|(leg, _, amount_in)| {
			self.build(SwapRequest {
				user,
				token_in: input_token,
				token_out: leg.token_out,
				amount_in: *amount_in,
				slippage_percent: self.slippage_percent,
				destination: executor,
			})
		}))
		.await?;

		Ok(priced
			.into_iter()
			.zip(swaps)
			.map(|((leg, quote, amount_in), swap)| Trade {
				leg,
				quote,
				amount_in,
				swap,
			})
			.collect())
	}

	async fn quote(&self, input_token: Address, leg: TradeLeg) -> Result<TradeQuote, ZapError> {
		let unavailable = |reason: String| ZapError::QuoteUnavailable {
			token_in: input_token,
			token_out: leg.token_out,
			reason,
		};

		let quote = self
			.aggregator
			.quote(input_token, leg.token_out, leg.amount_out)
			.await
			.map_err(|e| {
				error!(token_out = %leg.token_out, "Quote failed: {}", e);
				unavailable(e.to_string())
			})?;

		if quote.input_token.address != input_token || quote.output_token.address != leg.token_out {
			return Err(unavailable(format!(
				"quote is for {} -> {}",
				quote.input_token.address, quote.output_token.address
			)));
		}

		debug!(
			token_out = %leg.token_out,
			amount_out = %leg.amount_out,
			amount_in = %quote.input_amount,
			"Quoted precursor"
		);
		Ok(quote)
	}

	async fn build(&self, request: SwapRequest) -> Result<SwapCall, ZapError> {
		self.aggregator.build_swap(&request).await.map_err(|e| {
			error!(token_out = %request.token_out, "Swap build failed: {}", e);
			ZapError::NoRouteAvailable {
				token_in: request.token_in,
				token_out: request.token_out,
				reason: e.to_string(),
			}
		})
	}
}
