//! Executor call definitions.

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single instruction for the executor contract.
///
/// The `comment` is carried for diagnostics only and is never consulted
/// while planning or encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
	/// Contract the executor calls.
	pub target: Address,
	/// ABI-encoded calldata.
	pub payload: Bytes,
	/// Human readable description of the step.
	pub comment: String,
}

impl Call {
	pub fn new(target: Address, payload: impl Into<Bytes>, comment: impl Into<String>) -> Self {
		Self {
			target,
			payload: payload.into(),
			comment: comment.into(),
		}
	}
}

impl fmt::Display for Call {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} ({} bytes) {}",
			self.target,
			self.payload.len(),
			self.comment
		)
	}
}

/// Executor contract variant the plan is serialized for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorVariant {
	/// Batch entry point taking tightly packed call bytes.
	#[default]
	Packed,
	/// Entry point taking an array of `(to, payload)` structs.
	Structs,
}

impl fmt::Display for ExecutorVariant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExecutorVariant::Packed => write!(f, "packed"),
			ExecutorVariant::Structs => write!(f, "structs"),
		}
	}
}
