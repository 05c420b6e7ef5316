//! Planning inputs and outputs: basket requirements, approvals and plans.

use crate::call::Call;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Required quantity of each basket constituent for one target quantity.
///
/// Keys are unique by construction; amounts are in each constituent's
/// native unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketRequirement {
	quantities: BTreeMap<Address, U256>,
}

impl BasketRequirement {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a quantity. Returns `false` if the constituent was already present.
	pub fn insert(&mut self, token: Address, quantity: U256) -> bool {
		match self.quantities.entry(token) {
			btree_map::Entry::Vacant(slot) => {
				slot.insert(quantity);
				true
			}
			btree_map::Entry::Occupied(_) => false,
		}
	}

	/// Quantity required of `token`; zero if the basket does not list it.
	pub fn quantity_of(&self, token: &Address) -> U256 {
		self.quantities.get(token).copied().unwrap_or_default()
	}
}

/// Allowances the executor must grant before running the plan.
///
/// `tokens[i]` is approved for `spenders[i]`. A pair never appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSet {
	tokens: Vec<Address>,
	spenders: Vec<Address>,
}

impl ApprovalSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a pair unless it is already present. Returns whether it was added.
	pub fn insert(&mut self, token: Address, spender: Address) -> bool {
		if self.contains(&token, &spender) {
			return false;
		}
		self.tokens.push(token);
		self.spenders.push(spender);
		true
	}

	pub fn contains(&self, token: &Address, spender: &Address) -> bool {
		self.pairs().any(|(t, s)| t == token && s == spender)
	}

	pub fn tokens(&self) -> &[Address] {
		&self.tokens
	}

	pub fn spenders(&self) -> &[Address] {
		&self.spenders
	}

	pub fn pairs(&self) -> impl Iterator<Item = (&Address, &Address)> {
		self.tokens.iter().zip(self.spenders.iter())
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

/// The ordered, atomic call sequence produced by the planner.
///
/// Built once per planning invocation and handed to the executor as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
	input_token_amount: U256,
	calls: Vec<Call>,
}

impl Plan {
	pub fn new(input_token_amount: U256, calls: Vec<Call>) -> Self {
		Self {
			input_token_amount,
			calls,
		}
	}

	/// Total amount of the held asset the user must supply.
	pub fn input_token_amount(&self) -> U256 {
		self.input_token_amount
	}

	pub fn calls(&self) -> &[Call] {
		&self.calls
	}

	pub fn into_calls(self) -> Vec<Call> {
		self.calls
	}
}
