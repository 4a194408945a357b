//! Notification port
//!
//! Sessions report user-facing problems (backend errors, stalled streams)
//! through an injected [`Notifier`] instead of a global event bus. The port
//! is the only resource shared by all sessions; it is fire-and-forget.
//!
//! # Built-in Implementations
//!
//! - [`NoNotifier`] - drops everything
//! - [`ChannelNotifier`] - forwards into a tokio mpsc channel
//!
//! The REPL drains a [`ChannelNotifier`] and renders console alerts.

use tokio::sync::mpsc;

/// How serious a notification is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A dismissible alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    /// Slot of the session that raised it, `None` for global alerts.
    pub slot: Option<usize>,
    /// Model of the session that raised it.
    pub model: Option<String>,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            slot: None,
            model: None,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn for_session(mut self, slot: usize, model: impl Into<String>) -> Self {
        self.slot = Some(slot);
        self.model = Some(model.into());
        self
    }
}

/// Port for surfacing alerts to the user.
///
/// `notify` is synchronous and infallible so a slow or missing observer can
/// never stall a session.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// No-op implementation for tests and headless use.
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Forwards notifications into an unbounded channel.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }

    /// Create a notifier together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Receiver gone means nobody is watching; nothing to do
        let _ = self.tx.send(notification);
    }
}
