//! Port for structured attempt logging.
//!
//! Defines the [`AttemptLogger`] trait for recording every generation
//! attempt (raw text, signature, elapsed time, error) and every intent
//! resolution to a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the data needed to
//! replay or audit a vote.

use serde_json::Value;

/// A structured attempt event for logging.
pub struct AttemptEvent {
    /// Event type identifier (e.g., "attempt_completed", "intent_resolved").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AttemptEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging attempt events.
///
/// `log` is synchronous and infallible: logging failures never disturb
/// generation.
pub trait AttemptLogger: Send + Sync {
    fn log(&self, event: AttemptEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoAttemptLogger;

impl AttemptLogger for NoAttemptLogger {
    fn log(&self, _event: AttemptEvent) {}
}
