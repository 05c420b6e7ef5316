//! Token tables describing a basket asset and its constituents.

use crate::validation::ValidationError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// ERC-20 token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
}

/// An amount of a token, expressed in the token's native decimal unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
	pub token: Address,
	pub amount: U256,
}

impl TokenAmount {
	pub fn new(token: Address, amount: U256) -> Self {
		Self { token, amount }
	}
}

/// Exchange-rate convention of an interest-bearing wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperFamily {
	/// Compound-style cToken: `exchangeRateCurrent()` scaled by 1e18, truncating.
	Compound,
	/// Static aToken: `rate()` in ray (1e27), round-half-up.
	StaticAtoken,
}

impl fmt::Display for WrapperFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WrapperFamily::Compound => write!(f, "compound"),
			WrapperFamily::StaticAtoken => write!(f, "static_atoken"),
		}
	}
}

/// Rounding direction passed to the basket handler's quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
	#[default]
	Floor,
	Round,
	Ceil,
}

impl RoundingMode {
	/// ABI value of the on-chain `RoundingMode` enum.
	pub fn as_u8(self) -> u8 {
		match self {
			RoundingMode::Floor => 0,
			RoundingMode::Round => 1,
			RoundingMode::Ceil => 2,
		}
	}
}

/// A basket constituent that is minted from a precursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedToken {
	pub address: Address,
	pub symbol: String,
	/// Precursor deposited to mint this token.
	pub underlying: Address,
	pub family: WrapperFamily,
}

/// Token table for one basket asset.
///
/// Constituents are either wrapped tokens minted from a precursor, or
/// precursors listed in `direct` that the basket holds as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketTokens {
	/// The basket asset issued to the user.
	pub basket_token: Address,
	/// Contract answering `quote(amount, rounding)` for the basket.
	pub basket_handler: Address,
	/// Executor that runs the plan and receives swap proceeds.
	pub executor: Address,
	/// Tokens the planner acquires through the aggregator.
	pub precursors: Vec<Token>,
	#[serde(default)]
	pub wrapped: Vec<WrappedToken>,
	#[serde(default)]
	pub direct: Vec<Address>,
}

impl BasketTokens {
	pub fn precursor(&self, address: &Address) -> Option<&Token> {
		self.precursors.iter().find(|t| &t.address == address)
	}

	pub fn wrapped_token(&self, address: &Address) -> Option<&WrappedToken> {
		self.wrapped.iter().find(|w| &w.address == address)
	}

	pub fn is_wrapped(&self, address: &Address) -> bool {
		self.wrapped_token(address).is_some()
	}

	pub fn is_direct(&self, address: &Address) -> bool {
		self.direct.contains(address)
	}

	/// Whether the basket handler may list `address` as a constituent.
	pub fn is_constituent(&self, address: &Address) -> bool {
		self.is_wrapped(address) || self.is_direct(address)
	}

	/// Every token the executor may hold between steps, deduplicated in
	/// table order: precursors first, then wrapped constituents.
	pub fn intermediate_tokens(&self) -> Vec<Address> {
		let mut seen = HashSet::new();
		self.precursors
			.iter()
			.map(|t| t.address)
			.chain(self.wrapped.iter().map(|w| w.address))
			.filter(|a| seen.insert(*a))
			.collect()
	}

	/// Checks the table is self-consistent.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.precursors.is_empty() {
			return Err(ValidationError::MissingField("precursors".to_string()));
		}

		let mut seen = HashSet::new();
		let all = std::iter::once(self.basket_token)
			.chain(self.precursors.iter().map(|t| t.address))
			.chain(self.wrapped.iter().map(|w| w.address));
		for address in all {
			if !seen.insert(address) {
				return Err(ValidationError::InvalidValue {
					field: "tokens".to_string(),
					message: format!("address {} appears more than once", address),
				});
			}
		}

		for wrapped in &self.wrapped {
			if self.precursor(&wrapped.underlying).is_none() {
				return Err(ValidationError::InvalidValue {
					field: format!("wrapped.{}", wrapped.symbol),
					message: format!("underlying {} is not a precursor", wrapped.underlying),
				});
			}
		}

		for direct in &self.direct {
			if self.precursor(direct).is_none() {
				return Err(ValidationError::InvalidValue {
					field: "direct".to_string(),
					message: format!("{} is not a precursor", direct),
				});
			}
		}

		if self.wrapped.is_empty() && self.direct.is_empty() {
			return Err(ValidationError::MissingField("wrapped".to_string()));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(byte: u8) -> Address {
		Address::repeat_byte(byte)
	}

	fn table() -> BasketTokens {
		BasketTokens {
			basket_token: addr(0xee),
			basket_handler: addr(0xbb),
			executor: addr(0xec),
			precursors: vec![
				Token {
					address: addr(1),
					symbol: "USDC".into(),
					decimals: 6,
				},
				Token {
					address: addr(2),
					symbol: "USDT".into(),
					decimals: 6,
				},
			],
			wrapped: vec![WrappedToken {
				address: addr(0x11),
				symbol: "cUSDC".into(),
				underlying: addr(1),
				family: WrapperFamily::Compound,
			}],
			direct: vec![addr(2)],
		}
	}

	#[test]
	fn test_valid_table() {
		let tokens = table();
		assert!(tokens.validate().is_ok());
		assert!(tokens.is_constituent(&addr(0x11)));
		assert!(tokens.is_constituent(&addr(2)));
		assert!(!tokens.is_constituent(&addr(1)));
		assert_eq!(
			tokens.intermediate_tokens(),
			vec![addr(1), addr(2), addr(0x11)]
		);
	}

	#[test]
	fn test_wrapped_with_unknown_underlying_rejected() {
		let mut tokens = table();
		tokens.wrapped[0].underlying = addr(9);
		assert!(matches!(
			tokens.validate(),
			Err(ValidationError::InvalidValue { .. })
		));
	}

	#[test]
	fn test_duplicate_address_rejected() {
		let mut tokens = table();
		tokens.wrapped[0].address = addr(1);
		assert!(tokens.validate().is_err());
	}

	#[test]
	fn test_rounding_mode_abi_values() {
		assert_eq!(RoundingMode::Floor.as_u8(), 0);
		assert_eq!(RoundingMode::Round.as_u8(), 1);
		assert_eq!(RoundingMode::Ceil.as_u8(), 2);
	}
}
