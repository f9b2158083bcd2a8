//! Logging infrastructure for the round audit trail.
//!
//! Provides [`JsonlRoundLogger`], a JSONL file writer that implements
//! the [`RoundLogger`](roundtable_application::RoundLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlRoundLogger;
