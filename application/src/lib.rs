//! Application layer for roundtable
//!
//! This crate contains the Round Controller use case and the port
//! definitions its adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    facilitator::{FacilitatorError, FacilitatorGateway},
    round_logger::{NoRoundLogger, RoundEvent, RoundLogger},
    store::{DocumentStore, SessionStore, StoreError},
};
pub use use_cases::round_controller::{RoundController, RoundError, SubmitReceipt};
