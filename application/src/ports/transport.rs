//! Streaming transport port
//!
//! Defines how a chat session talks to its backend connection. One
//! connection per session; every connection reports into a single inbound
//! channel owned by the [`SessionManager`](crate::session::manager::SessionManager),
//! tagged with its [`ConnectionId`] so the manager can route (or discard)
//! each event.
//!
//! ```text
//! ChatSession ──send_text──▶ ChatConnection ──▶ connection task ──▶ server
//!                                                     │
//! SessionManager ◀──ConnectionEvent{id, event}────────┘
//! ```

use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised by transport adapters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,
}

/// Random numeric id placed in the connection URL (`/query/<id>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Exclusive upper bound of generated ids.
    pub const RANGE: u64 = 1_000_000_000;

    pub fn random() -> Self {
        Self(rand::random_range(0..Self::RANGE))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened on a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed; the connection accepts frames.
    Opened,
    /// A text frame from the server.
    Frame(String),
    /// The server closed the connection.
    Closed { reason: Option<String> },
    /// The connection could not be opened or broke.
    Failed(String),
}

/// A [`TransportEvent`] tagged with the connection it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub connection: ConnectionId,
    pub event: TransportEvent,
}

impl ConnectionEvent {
    pub fn new(connection: ConnectionId, event: TransportEvent) -> Self {
        Self { connection, event }
    }
}

/// Sending side of one open (or opening) connection
///
/// `send_text` never blocks: frames are queued for the connection task.
pub trait ChatConnection: Send {
    fn id(&self) -> ConnectionId;

    /// Queue a text frame for transmission.
    fn send_text(&self, frame: String) -> Result<(), TransportError>;

    /// Cancel the connection. Idempotent.
    fn close(&mut self);
}

/// Opens connections
///
/// `open` returns immediately; the handshake result arrives later on
/// `events` as [`TransportEvent::Opened`] or [`TransportEvent::Failed`].
/// Implementations that spawn tasks must be called from within a tokio runtime.
pub trait ChatConnector: Send + Sync {
    fn open(
        &self,
        id: ConnectionId,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Result<Box<dyn ChatConnection>, TransportError>;
}
