//! Recording fakes for planner tests.

use crate::rate::{RAY, WAD};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use zap_aggregator::{AggregatorError, AggregatorInterface};
use zap_chain::{BasketQuote, ChainError, ChainInterface};
use zap_types::{
	Address, BasketTokens, Bytes, RoundingMode, SwapCall, SwapRequest, Token,
	TradeQuote, WrappedToken, WrapperFamily, U256,
};

pub const USDC: u8 = 0x01;
pub const USDT: u8 = 0x02;
pub const DAI: u8 = 0x03;
pub const SAUSDC: u8 = 0x11;
pub const CUSDT: u8 = 0x12;
pub const BASKET: u8 = 0xee;
pub const HANDLER: u8 = 0xbb;
pub const EXECUTOR: u8 = 0xec;
pub const ROUTER: u8 = 0x99;
pub const USER: u8 = 0x55;

pub fn addr(byte: u8) -> Address {
	Address::repeat_byte(byte)
}

pub fn token(byte: u8) -> Token {
	let (symbol, decimals) = match byte {
		USDC => ("USDC", 6),
		USDT => ("USDT", 6),
		DAI => ("DAI", 18),
		_ => ("UNKNOWN", 18),
	};
	Token {
		address: addr(byte),
		symbol: symbol.to_string(),
		decimals,
	}
}

/// USDC and USDT precursors; saUSDC and cUSDT wrapped; USDC also held as-is.
pub fn sample_tokens() -> BasketTokens {
	BasketTokens {
		basket_token: addr(BASKET),
		basket_handler: addr(HANDLER),
		executor: addr(EXECUTOR),
		precursors: vec![token(USDC), token(USDT)],
		wrapped: vec![
			WrappedToken {
				address: addr(SAUSDC),
				symbol: "saUSDC".to_string(),
				underlying: addr(USDC),
				family: WrapperFamily::StaticAtoken,
			},
			WrappedToken {
				address: addr(CUSDT),
				symbol: "cUSDT".to_string(),
				underlying: addr(USDT),
				family: WrapperFamily::Compound,
			},
		],
		direct: vec![addr(USDC)],
	}
}

/// 50% saUSDC, 25% cUSDT, 25% USDC.
pub fn sample_basket() -> BasketQuote {
	BasketQuote {
		erc20s: vec![addr(SAUSDC), addr(CUSDT), addr(USDC)],
		quantities: vec![
			U256::from(10_000_000u64),
			U256::from(5_000_000u64),
			U256::from(5_000_000u64),
		],
	}
}

pub struct FakeChain {
	pub basket: BasketQuote,
	pub rates: HashMap<Address, U256>,
	/// Keyed by `(token, spender)`; missing pairs read as zero.
	pub allowances: HashMap<(Address, Address), U256>,
	pub fail_basket_quote: bool,
	pub fail_rate_for: Option<Address>,
	pub fail_allowance_for: Option<Address>,
	pub basket_quotes: Mutex<Vec<(U256, RoundingMode)>>,
	pub rate_reads: Mutex<Vec<Address>>,
	pub allowance_reads: Mutex<Vec<(Address, Address, Address)>>,
}

impl Default for FakeChain {
	fn default() -> Self {
		let mut rates = HashMap::new();
		// 1.02 ray
		rates.insert(addr(SAUSDC), RAY + RAY / U256::from(50));
		rates.insert(addr(CUSDT), WAD);

		Self {
			basket: sample_basket(),
			rates,
			allowances: HashMap::new(),
			fail_basket_quote: false,
			fail_rate_for: None,
			fail_allowance_for: None,
			basket_quotes: Mutex::new(Vec::new()),
			rate_reads: Mutex::new(Vec::new()),
			allowance_reads: Mutex::new(Vec::new()),
		}
	}
}

impl FakeChain {
	pub fn with_basket(mut self, basket: BasketQuote) -> Self {
		self.basket = basket;
		self
	}

	pub fn with_allowance(mut self, token: Address, spender: Address, amount: U256) -> Self {
		self.allowances.insert((token, spender), amount);
		self
	}

	/// Total chain reads observed.
	pub fn reads(&self) -> usize {
		self.basket_quotes.lock().unwrap().len()
			+ self.rate_reads.lock().unwrap().len()
			+ self.allowance_reads.lock().unwrap().len()
	}
}

#[async_trait]
impl ChainInterface for FakeChain {
	async fn basket_quote(
		&self,
		_basket_handler: Address,
		amount: U256,
		rounding: RoundingMode,
	) -> Result<BasketQuote, ChainError> {
		self.basket_quotes.lock().unwrap().push((amount, rounding));
		if self.fail_basket_quote {
			return Err(ChainError::Network("connection refused".into()));
		}
		Ok(self.basket.clone())
	}

	async fn exchange_rate(
		&self,
		token: Address,
		_family: WrapperFamily,
	) -> Result<U256, ChainError> {
		self.rate_reads.lock().unwrap().push(token);
		if self.fail_rate_for == Some(token) {
			return Err(ChainError::CallFailed {
				contract: token,
				reason: "execution reverted".into(),
			});
		}
		self.rates
			.get(&token)
			.copied()
			.ok_or_else(|| ChainError::CallFailed {
				contract: token,
				reason: "no rate".into(),
			})
	}

	async fn allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, ChainError> {
		self.allowance_reads
			.lock()
			.unwrap()
			.push((token, owner, spender));
		if self.fail_allowance_for == Some(token) {
			return Err(ChainError::CallFailed {
				contract: token,
				reason: "execution reverted".into(),
			});
		}
		Ok(self
			.allowances
			.get(&(token, spender))
			.copied()
			.unwrap_or_default())
	}
}

/// Prices every output at `price_bps / 10_000` of the held asset.
pub struct FakeAggregator {
	pub price_bps: u64,
	pub fail_quote_for: Option<Address>,
	pub no_route_for: Option<Address>,
	/// Artificial latency per output token, to scramble completion order.
	pub delays_ms: HashMap<Address, u64>,
	pub quotes: Mutex<Vec<(Address, Address, U256)>>,
	pub swaps: Mutex<Vec<SwapRequest>>,
	pub in_flight: AtomicUsize,
	pub max_in_flight: AtomicUsize,
}

impl Default for FakeAggregator {
	fn default() -> Self {
		Self {
			price_bps: 10_000,
			fail_quote_for: None,
			no_route_for: None,
			delays_ms: HashMap::new(),
			quotes: Mutex::new(Vec::new()),
			swaps: Mutex::new(Vec::new()),
			in_flight: AtomicUsize::new(0),
			max_in_flight: AtomicUsize::new(0),
		}
	}
}

impl FakeAggregator {
	async fn delay(&self, token: &Address) {
		let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_in_flight.fetch_max(current, Ordering::SeqCst);
		if let Some(ms) = self.delays_ms.get(token) {
			tokio::time::sleep(Duration::from_millis(*ms)).await;
		}
		self.in_flight.fetch_sub(1, Ordering::SeqCst);
	}
}

#[async_trait]
impl AggregatorInterface for FakeAggregator {
	async fn quote(
		&self,
		token_in: Address,
		token_out: Address,
		amount_out: U256,
	) -> Result<TradeQuote, AggregatorError> {
		self.quotes
			.lock()
			.unwrap()
			.push((token_in, token_out, amount_out));
		self.delay(&token_out).await;

		if self.fail_quote_for == Some(token_out) {
			return Err(AggregatorError::Api {
				status: 400,
				message: "insufficient liquidity".into(),
			});
		}

		Ok(TradeQuote {
			input_token: token(token_in.0[0]),
			output_token: token(token_out.0[0]),
			input_amount: amount_out * U256::from(self.price_bps) / U256::from(10_000u64),
			output_amount: amount_out,
		})
	}

	async fn build_swap(&self, request: &SwapRequest) -> Result<SwapCall, AggregatorError> {
		self.swaps.lock().unwrap().push(request.clone());
		self.delay(&request.token_out).await;

		if self.no_route_for == Some(request.token_out) {
			return Err(AggregatorError::NoRoute("no tx in response".into()));
		}

		let mut data = request.token_out.to_vec();
		data.extend_from_slice(&request.amount_in.to_be_bytes::<32>());
		Ok(SwapCall {
			to: addr(ROUTER),
			data: Bytes::from(data),
			expected_output: request.amount_in,
		})
	}
}
