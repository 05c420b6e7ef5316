//! On-chain read access for the zap planner.
//!
//! The planner needs four read-only facts from the chain: the basket
//! composition for a target quantity, the current exchange rate of each
//! wrapped constituent, and the executor's existing allowances. This crate
//! defines that capability as [`ChainInterface`] and provides an alloy
//! JSON-RPC implementation.

use async_trait::async_trait;
use thiserror::Error;
use zap_types::{Address, RoundingMode, WrapperFamily, U256};

pub mod implementations {
	pub mod evm;
}

/// Errors that can occur while reading chain state.
#[derive(Debug, Error)]
pub enum ChainError {
	/// The RPC endpoint could not be reached or configured.
	#[error("Network error: {0}")]
	Network(String),
	/// A contract call reverted or the node rejected it.
	#[error("Call to {contract} failed: {reason}")]
	CallFailed { contract: Address, reason: String },
	/// An argument cannot be represented in the contract's ABI type.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}

/// Parallel arrays returned by the basket handler's `quote`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketQuote {
	pub erc20s: Vec<Address>,
	pub quantities: Vec<U256>,
}

/// Read-only chain collaborator.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	/// Constituent quantities needed to issue `amount` of the basket asset.
	async fn basket_quote(
		&self,
		basket_handler: Address,
		amount: U256,
		rounding: RoundingMode,
	) -> Result<BasketQuote, ChainError>;

	/// Current exchange rate of a wrapped token, in the family's fixed-point scale.
	async fn exchange_rate(
		&self,
		token: Address,
		family: WrapperFamily,
	) -> Result<U256, ChainError>;

	/// `token.allowance(owner, spender)`.
	async fn allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, ChainError>;
}
