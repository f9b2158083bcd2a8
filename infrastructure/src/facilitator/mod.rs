//! Facilitator gateway adapters
//!
//! Implements FacilitatorGateway for the OpenAI chat completions API,
//! plus an offline stub and a failover decorator that substitutes
//! deterministic output when the primary gateway misbehaves.

pub mod failover;
pub mod openai;
pub mod stub;

pub use failover::FailoverFacilitator;
pub use openai::{DEFAULT_MODEL, OpenAiFacilitator};
pub use stub::StubFacilitator;
