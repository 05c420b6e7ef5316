//! Error types for zap planning.

use thiserror::Error;
use zap_types::Address;

/// Every way a planning call can fail. No variant is recovered locally:
/// planning either yields a complete plan or one of these.
#[derive(Debug, Error)]
pub enum ZapError {
	/// The held asset is a wrapped constituent or the basket asset itself.
	#[error("Unsupported input token: {0}")]
	UnsupportedInputToken(Address),

	/// The basket handler listed a token missing from the token table.
	#[error("Unknown basket constituent: {0}")]
	UnknownConstituent(Address),

	/// The basket handler returned arrays that cannot form a requirement.
	#[error("Malformed basket quote: {0}")]
	MalformedBasket(String),

	#[error("Basket quote failed: {0}")]
	BasketQuoteFailure(String),

	#[error("Exchange rate read for {token} failed: {reason}")]
	RateReadFailure { token: Address, reason: String },

	#[error("No quote for {token_in} -> {token_out}: {reason}")]
	QuoteUnavailable {
		token_in: Address,
		token_out: Address,
		reason: String,
	},

	#[error("No route for {token_in} -> {token_out}: {reason}")]
	NoRouteAvailable {
		token_in: Address,
		token_out: Address,
		reason: String,
	},

	#[error("Allowance read of {token} for {spender} failed: {reason}")]
	AllowanceReadFailure {
		token: Address,
		spender: Address,
		reason: String,
	},

	#[error("Arithmetic overflow in {0}")]
	ArithmeticOverflow(&'static str),

	#[error("Encoding error: {0}")]
	Encoding(String),
}
