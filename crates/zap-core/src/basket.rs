//! Basket composition lookup.

use crate::ZapError;
use std::sync::Arc;
use tracing::debug;
use zap_chain::ChainInterface;
use zap_types::{BasketRequirement, BasketTokens, RoundingMode, U256};

/// Asks the basket handler which constituents a target quantity needs.
pub struct BasketComposer {
	chain: Arc<dyn ChainInterface>,
}

impl BasketComposer {
	pub fn new(chain: Arc<dyn ChainInterface>) -> Self {
		Self { chain }
	}

	/// Resolves `target` of the basket asset into per-constituent quantities.
	///
	/// Every returned address must be a constituent listed in `tokens`;
	/// addresses compare as raw bytes so checksum casing cannot split a key.
	pub async fn compose(
		&self,
		tokens: &BasketTokens,
		target: U256,
		rounding: RoundingMode,
	) -> Result<BasketRequirement, ZapError> {
		let quote = self
			.chain
			.basket_quote(tokens.basket_handler, target, rounding)
			.await
			.map_err(|e| ZapError::BasketQuoteFailure(e.to_string()))?;

		if quote.erc20s.len() != quote.quantities.len() {
			return Err(ZapError::MalformedBasket(format!(
				"{} tokens but {} quantities",
				quote.erc20s.len(),
				quote.quantities.len()
			)));
		}

		let constituents = quote.erc20s.len();
		let mut requirement = BasketRequirement::new();
		for (token, quantity) in quote.erc20s.into_iter().zip(quote.quantities) {
			if !tokens.is_constituent(&token) {
				return Err(ZapError::UnknownConstituent(token));
			}
			if !requirement.insert(token, quantity) {
				return Err(ZapError::MalformedBasket(format!(
					"{} listed more than once",
					token
				)));
			}
		}

		debug!(
			constituents,
			target = %target,
			"Composed basket requirement"
		);

		Ok(requirement)
	}
}
