//! Calldata builders for the fixed, non-swap steps of a plan.

use alloy::sol;
use alloy::sol_types::SolCall;
use zap_types::{Address, ApprovalSet, Call, WrappedToken, WrapperFamily, U256};

sol! {
	interface IZapperExecutor {
		function setupApprovals(address[] calldata tokens, address[] calldata spenders) external;
		function drainERC20s(address[] calldata tokens, address destination) external;
	}

	interface ICToken {
		function mint(uint256 mintAmount) external returns (uint256);
	}

	interface IStaticATokenLM {
		function deposit(address recipient, uint256 amount, uint16 referralCode, bool fromUnderlying) external returns (uint256);
	}

	interface IRToken {
		function issueTo(address recipient, uint256 amount) external;
	}
}

/// One `setupApprovals` call on the executor covering the whole set.
pub fn approvals_call(executor: Address, approvals: &ApprovalSet) -> Call {
	let payload = IZapperExecutor::setupApprovalsCall {
		tokens: approvals.tokens().to_vec(),
		spenders: approvals.spenders().to_vec(),
	}
	.abi_encode();

	Call::new(executor, payload, "Setup approvals")
}

/// Mints `wrapped` by depositing `amount` of its precursor.
///
/// Static aTokens are deposited from the underlying with the executor as
/// recipient and no referral code.
pub fn mint_call(executor: Address, wrapped: &WrappedToken, amount: U256) -> Call {
	let payload = match wrapped.family {
		WrapperFamily::Compound => ICToken::mintCall { mintAmount: amount }.abi_encode(),
		WrapperFamily::StaticAtoken => IStaticATokenLM::depositCall {
			recipient: executor,
			amount,
			referralCode: 0,
			fromUnderlying: true,
		}
		.abi_encode(),
	};

	Call::new(wrapped.address, payload, format!("Mint {}", wrapped.symbol))
}

/// Issues `amount` of the basket asset straight to `recipient`.
pub fn issuance_call(basket_token: Address, recipient: Address, amount: U256) -> Call {
	let payload = IRToken::issueToCall { recipient, amount }.abi_encode();
	Call::new(basket_token, payload, "Issue basket token")
}

/// Returns every leftover balance of `tokens` held by the executor.
pub fn refund_call(executor: Address, tokens: Vec<Address>, destination: Address) -> Call {
	let payload = IZapperExecutor::drainERC20sCall {
		tokens,
		destination,
	}
	.abi_encode();

	Call::new(executor, payload, "Refund residuals")
}
