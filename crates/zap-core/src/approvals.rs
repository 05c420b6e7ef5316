//! Allowance planning for the executor.

use crate::ZapError;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use zap_chain::ChainInterface;
use zap_types::{Address, ApprovalSet};

/// Decides which `(token, spender)` pairs still need an approval.
pub struct ApprovalPlanner {
	chain: Arc<dyn ChainInterface>,
}

impl ApprovalPlanner {
	pub fn new(chain: Arc<dyn ChainInterface>) -> Self {
		Self { chain }
	}

	/// Reads the executor's allowance for every distinct candidate pair and
	/// keeps the pairs whose allowance is exactly zero, in candidate order.
	///
	/// A pair with any non-zero allowance is assumed to be sufficient.
	pub async fn plan(
		&self,
		owner: Address,
		candidates: &[(Address, Address)],
	) -> Result<ApprovalSet, ZapError> {
		let mut seen = HashSet::new();
		let unique: Vec<(Address, Address)> = candidates
			.iter()
			.copied()
			.filter(|pair| seen.insert(*pair))
			.collect();

		let reads = unique.iter().map(|&(token, spender)| async move {
			let allowance = self
				.chain
				.allowance(token, owner, spender)
				.await
				.map_err(|e| ZapError::AllowanceReadFailure {
					token,
					spender,
					reason: e.to_string(),
				})?;
			Ok::<_, ZapError>((token, spender, allowance))
		});
		let observed = try_join_all(reads).await?;

		let mut approvals = ApprovalSet::new();
		for (token, spender, allowance) in observed {
			if allowance.is_zero() {
				approvals.insert(token, spender);
			} else {
				debug!(%token, %spender, %allowance, "Allowance already granted");
			}
		}

		Ok(approvals)
	}
}
