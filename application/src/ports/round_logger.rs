//! Port for structured round logging.
//!
//! Defines the [`RoundLogger`] trait for recording loop events (session
//! creation, published questions, submitted answers, consolidations) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the round
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured round event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields; adapters add the timestamp at write time.
pub struct RoundEvent {
    /// Event type identifier (e.g. "answer_submitted", "round_consolidated").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RoundEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging round events to a structured log.
///
/// Implementations write each event as a single record (e.g. one JSONL
/// line). The `log` method is intentionally synchronous and non-fallible to
/// avoid disrupting the main execution flow; logging failures are silently
/// ignored.
pub trait RoundLogger: Send + Sync {
    /// Record a round event.
    fn log(&self, event: RoundEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoRoundLogger;

impl RoundLogger for NoRoundLogger {
    fn log(&self, _event: RoundEvent) {}
}
