//! A single model conversation bound to one streaming connection.
//!
//! The session is driven from outside: the manager feeds it connection
//! events and inactivity ticks, and calls [`ChatSession::send_query`] on user
//! input. Nothing here spawns tasks or holds locks.

use super::update::{SendOutcome, SessionUpdate, SkipReason, SlotId};
use crate::config::SessionConfig;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::notifier::{Notification, Notifier};
use crate::ports::transport::{ChatConnection, ConnectionId, TransportError};
use multichat_domain::{
    Answer, InboundEvent, InvalidTransition, MessageHistory, Model, Query, SessionState,
    StreamMetrics, Transition, build_envelope, decode_frame, preview,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Errors returned by [`ChatSession::send_query`]
///
/// On any of these the session is left exactly as it was before the call.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// One conversation with one model.
pub struct ChatSession {
    slot: SlotId,
    connection: Box<dyn ChatConnection>,
    model: Model,
    state: SessionState,
    history: MessageHistory,
    pending_answer: Answer,
    metrics: StreamMetrics,
    stream_started_at: Option<Instant>,
    last_activity: Option<Instant>,
    greeting: String,
    inactivity_timeout: Duration,
    notifier: Arc<dyn Notifier>,
    logger: Arc<dyn ConversationLogger>,
}

impl ChatSession {
    /// Create a session for a connection that is still opening.
    pub fn new(
        slot: SlotId,
        connection: Box<dyn ChatConnection>,
        model: Model,
        config: &SessionConfig,
        notifier: Arc<dyn Notifier>,
        logger: Arc<dyn ConversationLogger>,
    ) -> Self {
        Self {
            slot,
            connection,
            model,
            state: SessionState::Connecting,
            history: MessageHistory::with_greeting(config.greeting.clone()),
            pending_answer: Answer::empty(),
            metrics: StreamMetrics::new(),
            stream_started_at: None,
            last_activity: None,
            greeting: config.greeting.clone(),
            inactivity_timeout: config.inactivity_timeout,
            notifier,
            logger,
        }
    }

    // ==================== Accessors ====================

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    /// The answer currently being streamed (or the last one, until the next send).
    pub fn pending_answer(&self) -> &Answer {
        &self.pending_answer
    }

    pub fn metrics(&self) -> &StreamMetrics {
        &self.metrics
    }

    /// Text of the most recent answer, streamed or archived.
    pub fn latest_answer_text(&self) -> Option<&str> {
        if !self.pending_answer.is_empty() {
            return Some(self.pending_answer.content());
        }
        self.history
            .iter()
            .rev()
            .find(|entry| !entry.is_query() && !entry.content().is_empty())
            .map(|entry| entry.content())
    }

    /// When the in-flight answer is considered finished if no token arrives.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn inactivity_deadline(&self) -> Option<Instant> {
        if !self.state.is_streaming() {
            return None;
        }
        self.last_activity.and_then(|at| at.checked_add(self.inactivity_timeout))
    }

    // ==================== User Actions ====================

    /// Change the model placed in subsequent envelopes.
    pub fn select_model(&mut self, model: Model) {
        info!(slot = %self.slot, from = %self.model, to = %model, "Model selected");
        self.model = model;
    }

    /// Archive the pending answer and the query, then transmit the whole
    /// conversation.
    pub fn send_query(&mut self, query: &Query) -> Result<SendOutcome, SessionError> {
        if !self.state.is_open() {
            debug!(slot = %self.slot, state = %self.state, "Query skipped: not connected");
            return Ok(SendOutcome::Skipped(SkipReason::NotConnected));
        }
        if query.is_empty() {
            return Ok(SendOutcome::Skipped(SkipReason::EmptySubmission));
        }

        let next_state = self.state.apply(Transition::QuerySent)?;

        let mut history = self.history.clone();
        history.push_turn(self.pending_answer.clone(), query.clone());
        let frame = build_envelope(&self.model, &history, query.language()).to_json()?;
        self.connection.send_text(frame)?;

        let now = Instant::now();
        self.history = history;
        self.pending_answer = Answer::empty();
        self.metrics.reset();
        self.stream_started_at = Some(now);
        self.last_activity = Some(now);
        self.state = next_state;

        info!(
            slot = %self.slot,
            model = %self.model,
            entries = self.history.len(),
            "Query sent"
        );
        self.logger.log(ConversationEvent::new(
            "query_sent",
            json!({
                "slot": self.slot.number(),
                "connection": self.connection.id().0,
                "model": self.model.as_str(),
                "language": query.language(),
                "content": query.content(),
                "attachment": query.attachment().map(|a| a.file_name()),
                "history_len": self.history.len(),
            }),
        ));

        Ok(SendOutcome::Sent)
    }

    /// Replace the history with the greeting and clear the pending answer.
    ///
    /// Allowed in every state; the connection stays as it is.
    pub fn reset_message_history(&mut self) {
        self.history.reset(self.greeting.clone());
        self.pending_answer = Answer::empty();
        self.metrics.reset();
        debug!(slot = %self.slot, "History reset");
    }

    pub fn set_greeting(&mut self, greeting: impl Into<String>) {
        self.greeting = greeting.into();
    }

    /// Tear down the connection. Later events for it are ignored.
    pub fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.state = SessionState::Closed;
        self.connection.close();
        info!(slot = %self.slot, connection = %self.connection.id(), "Session closed");
        self.log_lifecycle("session_closed", None);
    }

    // ==================== Connection Events ====================

    /// Handshake completed.
    pub fn on_opened(&mut self) -> Option<SessionUpdate> {
        match self.state.apply(Transition::Opened) {
            Ok(next) => {
                self.state = next;
                info!(slot = %self.slot, connection = %self.connection.id(), "Session connected");
                self.log_lifecycle("session_opened", None);
                Some(SessionUpdate::Connected { slot: self.slot })
            }
            Err(e) => {
                debug!(slot = %self.slot, "{}", e);
                None
            }
        }
    }

    /// A text frame arrived from the server.
    pub fn on_frame(&mut self, text: &str) -> Option<SessionUpdate> {
        match decode_frame(text) {
            Ok(InboundEvent::Token(token)) => self.on_token(&token),
            Ok(InboundEvent::Error(message)) => Some(self.on_backend_error(message)),
            Ok(InboundEvent::Unrecognized(kind)) => {
                debug!(slot = %self.slot, kind = ?kind, "Ignoring unrecognized frame");
                None
            }
            Err(e) => {
                warn!(slot = %self.slot, frame = %preview(text, 80), "Dropping malformed frame: {}", e);
                None
            }
        }
    }

    fn on_token(&mut self, token: &str) -> Option<SessionUpdate> {
        if !self.state.is_streaming() {
            debug!(slot = %self.slot, state = %self.state, "Dropping token outside a stream");
            return None;
        }

        let now = Instant::now();
        let elapsed = self
            .stream_started_at
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default();

        self.pending_answer.push_token(token);
        let first = self.metrics.record_token(elapsed);
        self.last_activity = Some(now);

        trace!(slot = %self.slot, count = self.metrics.token_count(), "Token");
        Some(SessionUpdate::Token {
            slot: self.slot,
            scroll_into_view: first,
        })
    }

    fn on_backend_error(&mut self, message: String) -> SessionUpdate {
        warn!(slot = %self.slot, model = %self.model, "Backend error: {}", message);
        self.notifier.notify(
            Notification::error(message.clone()).for_session(self.slot.number(), self.model.as_str()),
        );
        self.logger.log(ConversationEvent::new(
            "backend_error",
            json!({
                "slot": self.slot.number(),
                "model": self.model.as_str(),
                "message": message,
            }),
        ));
        SessionUpdate::BackendError {
            slot: self.slot,
            message,
        }
    }

    /// The server closed the connection or the transport failed.
    pub fn on_connection_lost(&mut self, reason: Option<String>) -> Option<SessionUpdate> {
        let next = self.state.apply(Transition::ConnectionLost).ok()?;
        self.state = next;
        self.connection.close();
        warn!(
            slot = %self.slot,
            connection = %self.connection.id(),
            reason = reason.as_deref().unwrap_or("none"),
            "Connection lost"
        );
        self.log_lifecycle("session_closed", reason.as_deref());
        Some(SessionUpdate::Disconnected {
            slot: self.slot,
            reason,
        })
    }

    /// End the stream if no token arrived within the inactivity timeout.
    pub fn on_inactivity_timeout(&mut self, now: Instant) -> Option<SessionUpdate> {
        let deadline = self.inactivity_deadline()?;
        if now < deadline {
            return None;
        }
        self.state = self.state.apply(Transition::StreamEnded).ok()?;

        warn!(
            slot = %self.slot,
            model = %self.model,
            tokens = self.metrics.token_count(),
            "No token for {:?}, stream considered finished",
            self.inactivity_timeout
        );
        self.logger.log(ConversationEvent::new(
            "stream_idle",
            json!({
                "slot": self.slot.number(),
                "model": self.model.as_str(),
                "tokens": self.metrics.token_count(),
                "answer": self.pending_answer.content(),
                "ttft_seconds": self.metrics.time_to_first_token_seconds(),
                "tokens_per_second": self.metrics.tokens_per_second(),
            }),
        ));
        Some(SessionUpdate::StreamIdle { slot: self.slot })
    }

    fn log_lifecycle(&self, event_type: &'static str, reason: Option<&str>) {
        self.logger.log(ConversationEvent::new(
            event_type,
            json!({
                "slot": self.slot.number(),
                "connection": self.connection.id().0,
                "model": self.model.as_str(),
                "reason": reason,
            }),
        ));
    }
}
