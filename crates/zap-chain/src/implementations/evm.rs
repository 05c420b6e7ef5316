//! Alloy-based implementation of [`ChainInterface`].
//!
//! Issues `eth_call`s against an HTTP JSON-RPC endpoint. `exchangeRateCurrent`
//! is non-view on Compound but is evaluated statically here, so accrued
//! interest is reflected without sending a transaction.

use crate::{BasketQuote, ChainError, ChainInterface};
use alloy::primitives::aliases::U192;
use alloy::providers::{Provider, RootProvider};
use alloy::sol;
use async_trait::async_trait;
use zap_types::{Address, RoundingMode, WrapperFamily, U256};

sol! {
	#[sol(rpc)]
	interface IBasketHandler {
		function quote(uint192 amount, uint8 rounding)
			external
			view
			returns (address[] memory erc20s, uint256[] memory quantities);
	}

	#[sol(rpc)]
	interface ICToken {
		function exchangeRateCurrent() external returns (uint256);
	}

	#[sol(rpc)]
	interface IStaticAToken {
		function rate() external view returns (uint256);
	}

	#[sol(rpc)]
	interface IERC20 {
		function allowance(address owner, address spender) external view returns (uint256);
	}
}

/// Reads basket, rate and allowance state over JSON-RPC.
pub struct AlloyChainReader {
	provider: RootProvider,
	chain_id: u64,
}

impl AlloyChainReader {
	/// Creates a reader for the given HTTP RPC endpoint.
	pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self, ChainError> {
		let url = rpc_url
			.parse()
			.map_err(|e| ChainError::Network(format!("Invalid RPC URL: {}", e)))?;

		Ok(Self {
			provider: RootProvider::new_http(url),
			chain_id,
		})
	}

	/// Confirms the endpoint serves the configured chain.
	pub async fn verify_chain_id(&self) -> Result<(), ChainError> {
		let remote = self
			.provider
			.get_chain_id()
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get chain id: {}", e)))?;

		if remote != self.chain_id {
			return Err(ChainError::Network(format!(
				"RPC endpoint serves chain {} but {} is configured",
				remote, self.chain_id
			)));
		}
		Ok(())
	}
}

fn call_failed(contract: Address, err: impl std::fmt::Display) -> ChainError {
	ChainError::CallFailed {
		contract,
		reason: err.to_string(),
	}
}

#[async_trait]
impl ChainInterface for AlloyChainReader {
	async fn basket_quote(
		&self,
		basket_handler: Address,
		amount: U256,
		rounding: RoundingMode,
	) -> Result<BasketQuote, ChainError> {
		let limbs = amount.as_limbs();
		if limbs[3] != 0 {
			return Err(ChainError::InvalidArgument(format!(
				"basket amount {} exceeds uint192",
				amount
			)));
		}
		let amount = U192::from_limbs([limbs[0], limbs[1], limbs[2]]);

		let handler = IBasketHandler::new(basket_handler, &self.provider);
		let quoted = handler
			.quote(amount, rounding.as_u8())
			.call()
			.await
			.map_err(|e| call_failed(basket_handler, e))?;

		tracing::debug!(
			handler = %basket_handler,
			constituents = quoted.erc20s.len(),
			"Fetched basket quote"
		);

		Ok(BasketQuote {
			erc20s: quoted.erc20s,
			quantities: quoted.quantities,
		})
	}

	async fn exchange_rate(
		&self,
		token: Address,
		family: WrapperFamily,
	) -> Result<U256, ChainError> {
		let rate = match family {
			WrapperFamily::Compound => ICToken::new(token, &self.provider)
				.exchangeRateCurrent()
				.call()
				.await
				.map_err(|e| call_failed(token, e))?,
			WrapperFamily::StaticAtoken => IStaticAToken::new(token, &self.provider)
				.rate()
				.call()
				.await
				.map_err(|e| call_failed(token, e))?,
		};

		tracing::debug!(token = %token, %family, rate = %rate, "Fetched exchange rate");
		Ok(rate)
	}

	async fn allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, ChainError> {
		IERC20::new(token, &self.provider)
			.allowance(owner, spender)
			.call()
			.await
			.map_err(|e| call_failed(token, e))
	}
}
