//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod facilitator;
pub mod round_logger;
pub mod store;
