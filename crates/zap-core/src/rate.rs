//! Exchange-rate math for wrapped constituents.
//!
//! The two wrapper families round differently and each must match its own
//! on-chain accounting: static aTokens use ray multiplication rounding half
//! up, Compound cTokens scale by 1e18 and truncate.

use crate::ZapError;
use zap_types::{WrapperFamily, U256};

/// 1e27.
pub const RAY: U256 = U256::from_limbs([0x9fd0803ce8000000, 0x33b2e3c, 0, 0]);
/// 1e18.
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// `(a * b + RAY / 2) / RAY`.
pub fn ray_mul(a: U256, b: U256) -> Result<U256, ZapError> {
	let product = a
		.checked_mul(b)
		.and_then(|p| p.checked_add(RAY / U256::from(2)))
		.ok_or(ZapError::ArithmeticOverflow("ray_mul"))?;
	Ok(product / RAY)
}

/// Static-aToken conversion of `quantity` at a ray `rate`, rounding half up.
pub fn wrap_amount(quantity: U256, rate: U256) -> Result<U256, ZapError> {
	ray_mul(quantity, rate)
}

/// Compound conversion of `quantity` at a 1e18-scaled `rate`, truncating.
pub fn compound_mint_input(quantity: U256, rate: U256) -> Result<U256, ZapError> {
	let product = quantity
		.checked_mul(rate)
		.ok_or(ZapError::ArithmeticOverflow("compound_mint_input"))?;
	Ok(product / WAD)
}

/// Precursor amount to deposit so the executor receives `quantity` of the
/// wrapped token.
pub fn mint_input(family: WrapperFamily, quantity: U256, rate: U256) -> Result<U256, ZapError> {
	match family {
		WrapperFamily::Compound => compound_mint_input(quantity, rate),
		WrapperFamily::StaticAtoken => wrap_amount(quantity, rate),
	}
}
