//! Connection task per session.
//!
//! [`WebSocketConnector::open`] returns immediately with a
//! [`WebSocketConnection`] handle; the spawned task performs the handshake
//! (bounded by the open timeout) and then owns the stream exclusively:
//! outbound frames arrive over an mpsc channel, inbound frames leave as
//! [`ConnectionEvent`]s on the manager's channel.

use super::endpoint::WsEndpoint;
use super::error::WsError;
use futures::{SinkExt, StreamExt};
use multichat_application::{
    ChatConnection, ChatConnector, ConnectionEvent, ConnectionId, TransportError, TransportEvent,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Default time allowed for the WebSocket handshake.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens one WebSocket per session against a fixed endpoint.
pub struct WebSocketConnector {
    endpoint: WsEndpoint,
    open_timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(endpoint: WsEndpoint) -> Self {
        Self {
            endpoint,
            open_timeout: DEFAULT_OPEN_TIMEOUT,
        }
    }

    /// Build from the HTTP API base URL.
    pub fn from_api_url(api_url: &str) -> Result<Self, WsError> {
        Ok(Self::new(WsEndpoint::from_api_url(api_url)?))
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &WsEndpoint {
        &self.endpoint
    }
}

impl ChatConnector for WebSocketConnector {
    fn open(
        &self,
        id: ConnectionId,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Result<Box<dyn ChatConnection>, TransportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::ConnectionError(e.to_string()))?;

        let url = self.endpoint.query_url(id);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        debug!(connection = %id, url = %url, "Opening connection");
        runtime.spawn(run_connection(
            url,
            ConnectionContext {
                id,
                events,
                cancel: cancel.clone(),
            },
            outbound_rx,
            self.open_timeout,
        ));

        Ok(Box::new(WebSocketConnection {
            id,
            outbound: outbound_tx,
            cancel,
        }))
    }
}

/// Sending half of a session's connection.
///
/// Dropping the handle cancels the connection task.
pub struct WebSocketConnection {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl ChatConnection for WebSocketConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send_text(&self, frame: String) -> Result<(), TransportError> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::TransportClosed);
        }
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::TransportClosed)
    }

    fn close(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for WebSocketConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ConnectionContext {
    id: ConnectionId,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    cancel: CancellationToken,
}

impl ConnectionContext {
    fn emit(&self, event: TransportEvent) {
        // Manager gone means the application is shutting down
        let _ = self.events.send(ConnectionEvent::new(self.id, event));
    }
}

/// Connection task: handshake, then pump frames both ways until either side
/// closes or the handle cancels.
async fn run_connection(
    url: String,
    ctx: ConnectionContext,
    mut outbound: mpsc::UnboundedReceiver<String>,
    open_timeout: Duration,
) {
    let handshake = tokio::time::timeout(open_timeout, tokio_tungstenite::connect_async(&url));
    let ws_stream = tokio::select! {
        _ = ctx.cancel.cancelled() => {
            debug!(connection = %ctx.id, "Cancelled before handshake completed");
            return;
        }
        result = handshake => match result {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                let err = WsError::from_tungstenite(e);
                warn!(connection = %ctx.id, "Failed to connect to {}: {}", url, err);
                ctx.emit(TransportEvent::Failed(err.to_string()));
                return;
            }
            Err(_) => {
                warn!(connection = %ctx.id, "Handshake with {} timed out after {:?}", url, open_timeout);
                ctx.emit(TransportEvent::Failed(WsError::Timeout.to_string()));
                return;
            }
        }
    };

    info!(connection = %ctx.id, "Connection opened");
    ctx.emit(TransportEvent::Opened);

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        // Cancellation first: removal also drops the outbound sender
        tokio::select! {
            biased;

            _ = ctx.cancel.cancelled() => {
                let _ = ws_write.send(tungstenite::Message::Close(None)).await;
                debug!(connection = %ctx.id, "Connection closed locally");
                break;
            }

            frame = outbound.recv() => {
                let Some(text) = frame else {
                    let _ = ws_write.send(tungstenite::Message::Close(None)).await;
                    debug!(connection = %ctx.id, "Connection handle dropped");
                    break;
                };
                trace!(connection = %ctx.id, bytes = text.len(), "Sending frame");
                if let Err(e) = ws_write.send(tungstenite::Message::Text(text.into())).await {
                    warn!(connection = %ctx.id, "Failed to send frame: {}", e);
                    ctx.emit(TransportEvent::Failed(e.to_string()));
                    break;
                }
            }

            message = ws_read.next() => match message {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    ctx.emit(TransportEvent::Frame(text.as_str().to_string()));
                }
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_string())
                        .filter(|reason| !reason.is_empty());
                    info!(connection = %ctx.id, reason = ?reason, "Connection closed by server");
                    ctx.emit(TransportEvent::Closed { reason });
                    break;
                }
                Some(Ok(_)) => {
                    // binary, ping and pong frames carry nothing for us
                }
                Some(Err(e)) => {
                    warn!(connection = %ctx.id, "Connection error: {}", e);
                    ctx.emit(TransportEvent::Failed(e.to_string()));
                    break;
                }
                None => {
                    ctx.emit(TransportEvent::Closed { reason: None });
                    break;
                }
            }
        }
    }
}
