//! Shared types for the zap planning engine.
//!
//! This crate holds the data model that flows between the planner and its
//! collaborators: executor calls, token tables, aggregator quotes, approval
//! sets and the finished plan. It also provides the schema utilities used to
//! validate implementation-specific configuration tables.

pub mod call;
pub mod plan;
pub mod quote;
pub mod tokens;
pub mod validation;

pub use alloy_primitives::{Address, Bytes, U256};
pub use call::*;
pub use plan::*;
pub use quote::*;
pub use tokens::*;
pub use validation::*;
