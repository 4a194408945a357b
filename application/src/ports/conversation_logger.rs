//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording chat events
//! (queries sent, backend errors, stalled streams, connection lifecycle)
//! to a structured transcript.
//!
//! This is separate from `tracing`-based operation logs: tracing carries
//! diagnostic messages, while this port captures what was said to which
//! model in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The adapter stamps the time when writing.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier (e.g., "query_sent", "backend_error", "stream_idle").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible; write failures are swallowed by the
/// adapter so a full disk never interrupts a chat.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
