//! Executor payload serialization.
//!
//! A plan can be handed to either executor entry point: the packed batch
//! format, or an ABI array of `(to, payload)` structs. Both carry the calls
//! in plan order; neither adds or drops calls.

use crate::ZapError;
use alloy::sol;
use alloy::sol_types::SolValue;
use zap_types::{Bytes, Call, ExecutorVariant};

sol! {
	struct ExecutorCall {
		address to;
		bytes payload;
	}
}

/// Width of the zero `uint96` value field in the packed format.
const PACKED_VALUE_BYTES: usize = 12;

/// Serializes an ordered call list for one executor entry point.
pub trait CallSerializer: Send + Sync {
	fn serialize(&self, calls: &[Call]) -> Result<Bytes, ZapError>;
}

/// `address to ‖ uint96 value ‖ uint32 length ‖ payload` per call.
pub struct PackedCallSerializer;

impl CallSerializer for PackedCallSerializer {
	fn serialize(&self, calls: &[Call]) -> Result<Bytes, ZapError> {
		let mut out = Vec::with_capacity(
			calls
				.iter()
				.map(|c| 20 + PACKED_VALUE_BYTES + 4 + c.payload.len())
				.sum(),
		);

		for call in calls {
			let length = u32::try_from(call.payload.len()).map_err(|_| {
				ZapError::Encoding(format!(
					"payload for {} exceeds {} bytes",
					call.target,
					u32::MAX
				))
			})?;
			out.extend_from_slice(call.target.as_slice());
			out.extend_from_slice(&[0u8; PACKED_VALUE_BYTES]);
			out.extend_from_slice(&length.to_be_bytes());
			out.extend_from_slice(&call.payload);
		}

		Ok(out.into())
	}
}

/// ABI encoding of `ExecutorCall[]`.
pub struct StructCallSerializer;

impl CallSerializer for StructCallSerializer {
	fn serialize(&self, calls: &[Call]) -> Result<Bytes, ZapError> {
		let structs: Vec<ExecutorCall> = calls
			.iter()
			.map(|call| ExecutorCall {
				to: call.target,
				payload: call.payload.clone(),
			})
			.collect();
		Ok(structs.abi_encode().into())
	}
}

pub fn serializer_for(variant: ExecutorVariant) -> Box<dyn CallSerializer> {
	match variant {
		ExecutorVariant::Packed => Box::new(PackedCallSerializer),
		ExecutorVariant::Structs => Box::new(StructCallSerializer),
	}
}
