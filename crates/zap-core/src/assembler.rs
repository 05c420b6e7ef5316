//! Final plan assembly.

use zap_types::{Call, Plan, U256};

/// The calls produced by each planning step.
#[derive(Debug, Clone)]
pub struct PlanSteps {
	/// `None` when every needed allowance is already in place.
	pub approvals: Option<Call>,
	pub trades: Vec<Call>,
	pub mints: Vec<Call>,
	pub issuance: Call,
	pub refund: Call,
}

pub struct PlanAssembler;

impl PlanAssembler {
	/// Concatenates the steps in execution order: approvals, trades, mints,
	/// issuance, refund.
	pub fn assemble(input_token_amount: U256, steps: PlanSteps) -> Plan {
		let PlanSteps {
			approvals,
			trades,
			mints,
			issuance,
			refund,
		} = steps;

		let mut calls = Vec::with_capacity(trades.len() + mints.len() + 3);
		calls.extend(approvals);
		calls.extend(trades);
		calls.extend(mints);
		calls.push(issuance);
		calls.push(refund);

		Plan::new(input_token_amount, calls)
	}
}
