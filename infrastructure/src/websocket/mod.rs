//! WebSocket transport adapter
//!
//! One tokio task per session connection, each reporting into the session
//! manager's shared inbound channel:
//!
//! ```text
//! WebSocketConnection ──outbound mpsc──▶ connection task ──▶ ws://host/ws/query/<id>
//!                                              │
//!                      ConnectionEvent ◀───────┘
//! ```

pub mod connector;
pub mod endpoint;
pub mod error;

pub use connector::{WebSocketConnection, WebSocketConnector};
pub use endpoint::WsEndpoint;
pub use error::WsError;
