//! Session state machine.
//!
//! ```text
//! Connecting ──Opened──▶ Idle ──QuerySent──▶ Streaming ──┐
//!                          ▲                    │  ▲      │ QuerySent
//!                          └────StreamEnded─────┘  └──────┘
//!
//! any ──Close / ConnectionLost──▶ Closed (terminal)
//! ```
//!
//! `Streaming + QuerySent` stays in `Streaming`: the protocol has no
//! end-of-answer frame, so the next query is what closes the previous turn.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Connection requested, handshake not finished yet.
    Connecting,
    /// Connection open, no answer in flight.
    Idle,
    /// A query was sent and tokens may arrive.
    Streaming,
    /// Torn down. A new session must be created for the slot.
    Closed,
}

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Transport handshake completed.
    Opened,
    /// A query envelope was transmitted.
    QuerySent,
    /// The in-flight answer is considered finished (inactivity timeout).
    StreamEnded,
    /// The remote side closed the connection or the transport failed.
    ConnectionLost,
    /// Explicit teardown.
    Close,
}

/// Rejected state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid transition: {transition:?} from {from:?}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub transition: Transition,
}

impl SessionState {
    /// Apply a transition, returning the next state or rejecting the pair.
    pub fn apply(self, transition: Transition) -> Result<SessionState, InvalidTransition> {
        use SessionState::*;
        use Transition::*;

        match (self, transition) {
            (Connecting, Opened) => Ok(Idle),
            (Idle, QuerySent) | (Streaming, QuerySent) => Ok(Streaming),
            (Streaming, StreamEnded) => Ok(Idle),
            (Connecting | Idle | Streaming, ConnectionLost) => Ok(Closed),
            (_, Close) => Ok(Closed),
            (from, transition) => Err(InvalidTransition { from, transition }),
        }
    }

    /// True when a query may be transmitted.
    pub fn is_open(self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Streaming)
    }

    pub fn is_streaming(self) -> bool {
        self == SessionState::Streaming
    }

    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Connecting => "connecting",
            SessionState::Idle => "idle",
            SessionState::Streaming => "streaming",
            SessionState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
