//! Test doubles for the transport, notifier and logger ports.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::notifier::{Notification, Notifier};
use crate::ports::transport::{
    ChatConnection, ChatConnector, ConnectionEvent, ConnectionId, TransportError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Shared record of everything the mock transport saw
#[derive(Default)]
pub struct Wire {
    pub frames: Mutex<Vec<(ConnectionId, String)>>,
    pub opened: Mutex<Vec<ConnectionId>>,
    pub closed: Mutex<Vec<ConnectionId>>,
    pub fail_sends: AtomicBool,
}

impl Wire {
    pub fn frames_for(&self, id: ConnectionId) -> Vec<String> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .filter(|(conn, _)| *conn == id)
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

pub struct MockConnection {
    id: ConnectionId,
    wire: Arc<Wire>,
}

impl MockConnection {
    pub fn new(id: ConnectionId, wire: Arc<Wire>) -> Self {
        Self { id, wire }
    }
}

impl ChatConnection for MockConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send_text(&self, frame: String) -> Result<(), TransportError> {
        if self.wire.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::TransportClosed);
        }
        self.wire.frames.lock().unwrap().push((self.id, frame));
        Ok(())
    }

    fn close(&mut self) {
        self.wire.closed.lock().unwrap().push(self.id);
    }
}

/// Connector that records opened ids; the test drives events by hand.
#[derive(Default)]
pub struct MockConnector {
    pub wire: Arc<Wire>,
    pub fail_open: AtomicBool,
}

impl ChatConnector for MockConnector {
    fn open(
        &self,
        id: ConnectionId,
        _events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Result<Box<dyn ChatConnection>, TransportError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionError("refused".to_string()));
        }
        self.wire.opened.lock().unwrap().push(id);
        Ok(Box::new(MockConnection::new(id, self.wire.clone())))
    }
}

#[derive(Default)]
pub struct CollectingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct CollectingLogger {
    pub events: Mutex<Vec<ConversationEvent>>,
}

impl CollectingLogger {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }
}

impl ConversationLogger for CollectingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn token_frame(token: &str) -> String {
    serde_json::json!({ "type": "token", "token": token }).to_string()
}

pub fn error_frame(message: &str) -> String {
    serde_json::json!({ "type": "error", "message": message }).to_string()
}
