//! Aggregator quote and swap types.

use crate::tokens::Token;
use alloy_primitives::{Address, Bytes, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time estimate: `output_amount` of `output_token` costs
/// `input_amount` of `input_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuote {
	pub input_token: Token,
	pub output_token: Token,
	pub input_amount: U256,
	pub output_amount: U256,
}

/// Parameters for building an executable swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
	/// Address the aggregator treats as the trader.
	pub user: Address,
	pub token_in: Address,
	pub token_out: Address,
	/// Exact amount of `token_in` sold.
	pub amount_in: U256,
	/// Acceptable output shortfall in percent, e.g. `0.5`.
	pub slippage_percent: Decimal,
	/// Receiver of the swap proceeds.
	pub destination: Address,
}

/// Ready-to-submit swap returned by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCall {
	/// Router contract to call.
	pub to: Address,
	pub data: Bytes,
	/// Output the aggregator expects the swap to deliver.
	pub expected_output: U256,
}
