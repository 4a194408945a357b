//! Values produced by the chat engine for the presentation layer.

use super::chat_session::SessionError;

/// Positional identity of a session inside the manager (0-based).
///
/// Displayed 1-based, which is also how users refer to slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }

    /// 1-based number shown to users.
    pub fn number(self) -> usize {
        self.0 + 1
    }

    /// Parse a 1-based slot number; `0` is not a slot.
    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).map(SlotId)
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.number())
    }
}

/// Observable change in one session, returned by the event pump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Handshake finished; the session accepts queries.
    Connected { slot: SlotId },
    /// A token was appended to the pending answer.
    ///
    /// `scroll_into_view` is set on the first token of a turn only.
    Token { slot: SlotId, scroll_into_view: bool },
    /// The backend reported an error; the answer is untouched.
    BackendError { slot: SlotId, message: String },
    /// No token arrived within the inactivity timeout; back to idle.
    StreamIdle { slot: SlotId },
    /// The connection is gone; the session is closed.
    Disconnected {
        slot: SlotId,
        reason: Option<String>,
    },
}

impl SessionUpdate {
    pub fn slot(&self) -> SlotId {
        match self {
            SessionUpdate::Connected { slot }
            | SessionUpdate::Token { slot, .. }
            | SessionUpdate::BackendError { slot, .. }
            | SessionUpdate::StreamIdle { slot }
            | SessionUpdate::Disconnected { slot, .. } => *slot,
        }
    }
}

/// Why a query was not transmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Connection still opening or already closed.
    NotConnected,
    /// No text and no attachment.
    EmptySubmission,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotConnected => write!(f, "not connected"),
            SkipReason::EmptySubmission => write!(f, "empty submission"),
        }
    }
}

/// Result of a successful `send_query` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Skipped(SkipReason),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

/// Per-slot results of a broadcast
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub sent: Vec<SlotId>,
    pub skipped: Vec<(SlotId, SkipReason)>,
    pub failed: Vec<(SlotId, SessionError)>,
}

impl BroadcastReport {
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Nothing was transmitted anywhere.
    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}
