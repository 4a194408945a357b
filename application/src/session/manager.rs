//! Session manager
//!
//! Owns every [`ChatSession`] and the single inbound channel all connections
//! report into. Mirrors a message router: one receiver, events tagged with a
//! connection id, dispatched to whichever session currently owns that id.
//!
//! ```text
//! connection task (id=17) ─┐
//! connection task (id=903) ─┼─▶ events_rx ──▶ SessionManager::handle_event ──▶ ChatSession
//! connection task (id=5)  ─┘                       │
//!                                                   └─ unknown / closed id → discarded
//! ```
//!
//! The manager is driven by one task; sessions are never shared.

use super::chat_session::ChatSession;
use super::update::{BroadcastReport, SendOutcome, SessionUpdate, SlotId};
use crate::config::SessionConfig;
use crate::ports::conversation_logger::ConversationLogger;
use crate::ports::notifier::Notifier;
use crate::ports::transport::{
    ChatConnector, ConnectionEvent, ConnectionId, TransportError, TransportEvent,
};
use multichat_domain::{Model, ModelDescriptor, Query};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// Bounded, ordered collection of chat sessions.
pub struct SessionManager {
    config: SessionConfig,
    connector: Arc<dyn ChatConnector>,
    notifier: Arc<dyn Notifier>,
    logger: Arc<dyn ConversationLogger>,
    sessions: Vec<ChatSession>,
    events_tx: mpsc::UnboundedSender<ConnectionEvent>,
    events_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
    available_models: Vec<ModelDescriptor>,
    default_model: Model,
    language: String,
}

impl SessionManager {
    /// Create the manager and open the startup sessions (at least one).
    ///
    /// A maximum below one is raised to one.
    pub fn new(
        mut config: SessionConfig,
        connector: Arc<dyn ChatConnector>,
        notifier: Arc<dyn Notifier>,
        logger: Arc<dyn ConversationLogger>,
    ) -> Result<Self, TransportError> {
        config.max_sessions = config.max_sessions.max(1);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut manager = Self {
            default_model: config.default_model.clone(),
            language: config.language.clone(),
            config,
            connector,
            notifier,
            logger,
            sessions: Vec::new(),
            events_tx,
            events_rx,
            available_models: Vec::new(),
        };

        for _ in 0..manager.config.startup_sessions() {
            manager.add_session()?;
        }
        Ok(manager)
    }

    // ==================== Accessors ====================

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session(&self, slot: SlotId) -> Option<&ChatSession> {
        self.sessions.get(slot.index())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.config.max_sessions
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn default_model(&self) -> &Model {
        &self.default_model
    }

    pub fn available_models(&self) -> &[ModelDescriptor] {
        &self.available_models
    }

    // ==================== Session Lifecycle ====================

    /// Open one more session, unless the maximum is reached (`Ok(None)`).
    pub fn add_session(&mut self) -> Result<Option<SlotId>, TransportError> {
        if self.sessions.len() >= self.config.max_sessions {
            debug!(max = self.config.max_sessions, "Session limit reached");
            return Ok(None);
        }

        let id = self.fresh_connection_id();
        let connection = self.connector.open(id, self.events_tx.clone())?;
        let slot = SlotId(self.sessions.len());

        self.sessions.push(ChatSession::new(
            slot,
            connection,
            self.default_model.clone(),
            &self.config,
            self.notifier.clone(),
            self.logger.clone(),
        ));
        info!(slot = %slot, connection = %id, model = %self.default_model, "Session added");
        Ok(Some(slot))
    }

    /// Close and discard the last session, unless it is the only one.
    pub fn remove_session(&mut self) -> Option<SlotId> {
        if self.sessions.len() <= 1 {
            return None;
        }
        let mut session = self.sessions.pop()?;
        session.close();
        info!(slot = %session.slot(), "Session removed");
        Some(session.slot())
    }

    /// Close every session.
    pub fn shutdown(&mut self) {
        for session in &mut self.sessions {
            session.close();
        }
    }

    fn fresh_connection_id(&self) -> ConnectionId {
        loop {
            let id = ConnectionId::random();
            if !self.sessions.iter().any(|s| s.connection_id() == id) {
                return id;
            }
        }
    }

    // ==================== Fan-out ====================

    /// Send the same query to every session in slot order.
    ///
    /// A failing session is recorded in the report; the others still receive
    /// the query.
    pub fn broadcast_query(&mut self, query: &Query) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for session in &mut self.sessions {
            let slot = session.slot();
            match session.send_query(query) {
                Ok(SendOutcome::Sent) => report.sent.push(slot),
                Ok(SendOutcome::Skipped(reason)) => report.skipped.push((slot, reason)),
                Err(e) => {
                    warn!(slot = %slot, "Failed to send query: {}", e);
                    report.failed.push((slot, e));
                }
            }
        }
        report
    }

    pub fn reset_all(&mut self) {
        for session in &mut self.sessions {
            session.reset_message_history();
        }
        info!(sessions = self.sessions.len(), "All histories reset");
    }

    /// Switch the conversation language; every history restarts.
    ///
    /// Returns `false` when the language is unchanged.
    pub fn change_language(&mut self, language: impl Into<String>) -> bool {
        let language = language.into();
        if language == self.language {
            return false;
        }
        info!(from = %self.language, to = %language, "Language changed");
        self.language = language;
        self.reset_all();
        true
    }

    /// Change the greeting used by subsequent resets.
    pub fn set_greeting(&mut self, greeting: impl Into<String>) {
        let greeting = greeting.into();
        for session in &mut self.sessions {
            session.set_greeting(greeting.clone());
        }
        self.config.greeting = greeting;
    }

    // ==================== Models ====================

    /// Assign a model to one session. Returns `false` for an unknown slot.
    pub fn select_model(&mut self, slot: SlotId, model: Model) -> bool {
        match self.sessions.get_mut(slot.index()) {
            Some(session) => {
                session.select_model(model);
                true
            }
            None => false,
        }
    }

    /// Store the catalog. Without a configured default, its first entry
    /// becomes the default and is applied to sessions that have none yet.
    pub fn set_available_models(&mut self, models: Vec<ModelDescriptor>) {
        if let Some(first) = models.first()
            && self.default_model.is_unset()
        {
            self.default_model = first.model();
            for session in &mut self.sessions {
                if session.model().is_unset() {
                    session.select_model(self.default_model.clone());
                }
            }
        }
        info!(count = models.len(), default = %self.default_model, "Model catalog loaded");
        self.available_models = models;
    }

    // ==================== Event Pump ====================

    /// Route one connection event to its session.
    ///
    /// Events for ids that belong to no live session are discarded.
    pub fn handle_event(&mut self, event: ConnectionEvent) -> Option<SessionUpdate> {
        let Some(session) = self
            .sessions
            .iter_mut()
            .find(|s| s.connection_id() == event.connection && !s.state().is_closed())
        else {
            debug!(connection = %event.connection, "Discarding event for unknown connection");
            return None;
        };

        match event.event {
            TransportEvent::Opened => session.on_opened(),
            TransportEvent::Frame(text) => session.on_frame(&text),
            TransportEvent::Closed { reason } => session.on_connection_lost(reason),
            TransportEvent::Failed(message) => session.on_connection_lost(Some(message)),
        }
    }

    /// End every stream whose inactivity deadline has passed; returns the
    /// first resulting update.
    pub fn expire_idle_streams(&mut self, now: Instant) -> Option<SessionUpdate> {
        self.sessions
            .iter_mut()
            .find_map(|session| session.on_inactivity_timeout(now))
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.sessions
            .iter()
            .filter_map(ChatSession::inactivity_deadline)
            .min()
    }

    /// Wait for the next observable change in any session.
    ///
    /// Cancel-safe: dropping the future loses no events.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            let deadline = self.next_deadline();
            let idle = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = self.events_rx.recv() => {
                    let event = event?;
                    if let Some(update) = self.handle_event(event) {
                        return Some(update);
                    }
                }
                _ = idle => {
                    if let Some(update) = self.expire_idle_streams(Instant::now()) {
                        return Some(update);
                    }
                }
            }
        }
    }

    /// Sender handed to connections; exposed for adapters that reconnect
    /// outside the manager.
    pub fn events_sender(&self) -> mpsc::UnboundedSender<ConnectionEvent> {
        self.events_tx.clone()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::conversation_logger::NoConversationLogger;
    use crate::ports::notifier::NoNotifier;
    use crate::session::testing::{CollectingNotifier, MockConnector, error_frame, token_frame};
    use crate::session::update::SkipReason;
    use multichat_domain::SessionState;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn manager_with(config: SessionConfig, connector: Arc<MockConnector>) -> SessionManager {
        SessionManager::new(
            config,
            connector,
            Arc::new(NoNotifier),
            Arc::new(NoConversationLogger),
        )
        .unwrap()
    }

    fn open_all(manager: &mut SessionManager) {
        let ids: Vec<_> = manager.sessions().iter().map(|s| s.connection_id()).collect();
        for id in ids {
            manager.handle_event(ConnectionEvent::new(id, TransportEvent::Opened));
        }
    }

    fn frame(manager: &SessionManager, slot: usize, text: String) -> ConnectionEvent {
        ConnectionEvent::new(
            manager.sessions()[slot].connection_id(),
            TransportEvent::Frame(text),
        )
    }

    #[tokio::test]
    async fn test_starts_with_one_session() {
        let connector = Arc::new(MockConnector::default());
        let manager = manager_with(SessionConfig::default(), connector.clone());

        assert_eq!(manager.len(), 1);
        assert_eq!(connector.wire.opened.lock().unwrap().len(), 1);
        assert_eq!(manager.sessions()[0].state(), SessionState::Connecting);
    }

    #[tokio::test]
    async fn test_starts_with_initial_sessions() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_initial_sessions(3);
        let manager = manager_with(config, connector);

        assert_eq!(manager.len(), 3);
        let slots: Vec<_> = manager.sessions().iter().map(|s| s.slot()).collect();
        assert_eq!(slots, vec![SlotId(0), SlotId(1), SlotId(2)]);
    }

    #[tokio::test]
    async fn test_zero_maximum_still_opens_one_session() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default()
            .with_max_sessions(0)
            .with_initial_sessions(0);
        let mut manager = manager_with(config, connector.clone());

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.max_sessions(), 1);
        assert_eq!(connector.wire.opened.lock().unwrap().len(), 1);
        assert_eq!(manager.add_session().unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_respects_maximum() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default().with_max_sessions(4), connector);

        for _ in 0..5 {
            manager.add_session().unwrap();
        }

        assert_eq!(manager.len(), 4);
        assert_eq!(manager.add_session().unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_keeps_last_session() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector.clone());

        assert_eq!(manager.remove_session(), None);
        assert_eq!(manager.len(), 1);

        manager.add_session().unwrap();
        let removed_id = manager.sessions()[1].connection_id();
        assert_eq!(manager.remove_session(), Some(SlotId(1)));
        assert_eq!(manager.len(), 1);
        assert!(connector.wire.closed.lock().unwrap().contains(&removed_id));
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default()
            .with_max_sessions(8)
            .with_initial_sessions(8);
        let manager = manager_with(config, connector);

        let mut ids: Vec<_> = manager.sessions().iter().map(|s| s.connection_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[tokio::test]
    async fn test_open_failure_is_returned() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector.clone());

        connector.fail_open.store(true, Ordering::SeqCst);

        assert!(manager.add_session().is_err());
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_open_session() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_initial_sessions(3);
        let mut manager = manager_with(config, connector.clone());
        // slot 2 never finishes its handshake
        for slot in 0..2 {
            let id = manager.sessions()[slot].connection_id();
            manager.handle_event(ConnectionEvent::new(id, TransportEvent::Opened));
        }

        let report = manager.broadcast_query(&Query::new("hello", "en"));

        assert_eq!(report.sent, vec![SlotId(0), SlotId(1)]);
        assert_eq!(report.skipped, vec![(SlotId(2), SkipReason::NotConnected)]);
        assert!(!report.has_failures());
        assert_eq!(connector.wire.frame_count(), 2);
        assert_eq!(manager.sessions()[0].history().len(), 3);
        assert_eq!(manager.sessions()[2].history().len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_failure_is_isolated() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_initial_sessions(2);
        let mut manager = manager_with(config, connector.clone());
        open_all(&mut manager);
        connector.wire.set_fail_sends(true);

        let report = manager.broadcast_query(&Query::new("hello", "en"));

        assert_eq!(report.failed.len(), 2);
        assert!(report.is_empty());
        assert_eq!(manager.sessions()[0].state(), SessionState::Idle);
        assert_eq!(manager.sessions()[1].history().len(), 1);
    }

    #[tokio::test]
    async fn test_events_routed_by_connection_id() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_initial_sessions(2);
        let mut manager = manager_with(config, connector);
        open_all(&mut manager);
        manager.broadcast_query(&Query::new("hello", "en"));

        let event = frame(&manager, 1, token_frame("only slot two"));
        let update = manager.handle_event(event);

        assert_eq!(update.map(|u| u.slot()), Some(SlotId(1)));
        assert!(manager.sessions()[0].pending_answer().is_empty());
        assert_eq!(
            manager.sessions()[1].pending_answer().content(),
            "only slot two"
        );
    }

    #[tokio::test]
    async fn test_events_for_removed_session_are_discarded() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_initial_sessions(2);
        let mut manager = manager_with(config, connector);
        open_all(&mut manager);
        manager.broadcast_query(&Query::new("hello", "en"));
        let stale = frame(&manager, 1, token_frame("late"));

        manager.remove_session();

        assert!(manager.handle_event(stale).is_none());
        assert!(
            manager
                .handle_event(ConnectionEvent::new(ConnectionId(u64::MAX), TransportEvent::Opened))
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_events_for_closed_session_are_discarded() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector);
        open_all(&mut manager);
        let id = manager.sessions()[0].connection_id();

        let update = manager.handle_event(ConnectionEvent::new(
            id,
            TransportEvent::Closed { reason: None },
        ));
        assert!(matches!(update, Some(SessionUpdate::Disconnected { .. })));

        assert!(
            manager
                .handle_event(ConnectionEvent::new(id, TransportEvent::Opened))
                .is_none()
        );
        assert_eq!(manager.sessions()[0].state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_error_frame_notifies_with_slot() {
        let connector = Arc::new(MockConnector::default());
        let notifier = Arc::new(CollectingNotifier::default());
        let config = SessionConfig::default().with_initial_sessions(2);
        let mut manager =
            SessionManager::new(config, connector, notifier.clone(), Arc::new(NoConversationLogger))
                .unwrap();
        open_all(&mut manager);

        let event = frame(&manager, 1, error_frame("quota exceeded"));
        manager.handle_event(event);

        let notifications = notifier.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].slot, Some(2));
        assert_eq!(notifications[0].message, "quota exceeded");
    }

    #[tokio::test]
    async fn test_reset_all() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_initial_sessions(2);
        let mut manager = manager_with(config, connector);
        open_all(&mut manager);
        manager.broadcast_query(&Query::new("hello", "en"));

        manager.reset_all();

        for session in manager.sessions() {
            assert_eq!(session.history().len(), 1);
            assert!(session.pending_answer().is_empty());
        }
    }

    #[tokio::test]
    async fn test_new_greeting_applies_on_reset() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector);

        manager.set_greeting("Hallo!");
        assert_ne!(manager.sessions()[0].history().entries()[0].content(), "Hallo!");

        manager.reset_all();
        assert_eq!(manager.sessions()[0].history().entries()[0].content(), "Hallo!");

        manager.add_session().unwrap();
        assert_eq!(manager.sessions()[1].history().entries()[0].content(), "Hallo!");
    }

    #[tokio::test]
    async fn test_change_language_resets_histories() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector);
        open_all(&mut manager);
        manager.broadcast_query(&Query::new("hello", "en"));

        assert!(!manager.change_language("en"));
        assert_eq!(manager.sessions()[0].history().len(), 3);

        assert!(manager.change_language("ja"));
        assert_eq!(manager.language(), "ja");
        assert_eq!(manager.sessions()[0].history().len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_sets_default_model() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector);
        manager.add_session().unwrap();
        manager.select_model(SlotId(1), Model::new("picked"));

        manager.set_available_models(vec![
            ModelDescriptor {
                name: "granite".to_string(),
            },
            ModelDescriptor {
                name: "llama".to_string(),
            },
        ]);

        assert_eq!(manager.default_model().as_str(), "granite");
        assert_eq!(manager.sessions()[0].model().as_str(), "granite");
        assert_eq!(manager.sessions()[1].model().as_str(), "picked");

        manager.add_session().unwrap();
        assert_eq!(manager.sessions()[2].model().as_str(), "granite");
    }

    #[tokio::test]
    async fn test_configured_default_survives_catalog() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_default_model(Model::new("llama"));
        let mut manager = manager_with(config, connector);

        manager.set_available_models(vec![ModelDescriptor {
            name: "granite".to_string(),
        }]);

        assert_eq!(manager.default_model().as_str(), "llama");
        assert_eq!(manager.sessions()[0].model().as_str(), "llama");
        assert_eq!(manager.available_models().len(), 1);
    }

    #[tokio::test]
    async fn test_select_model_unknown_slot() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector);

        assert!(!manager.select_model(SlotId(5), Model::new("x")));
    }

    #[tokio::test]
    async fn test_shutdown_closes_everything() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_initial_sessions(2);
        let mut manager = manager_with(config, connector.clone());

        manager.shutdown();

        assert!(manager.sessions().iter().all(|s| s.state().is_closed()));
        assert_eq!(connector.wire.closed.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_update_routes_queued_events() {
        let connector = Arc::new(MockConnector::default());
        let mut manager = manager_with(SessionConfig::default(), connector);
        let id = manager.sessions()[0].connection_id();
        let tx = manager.events_sender();

        tx.send(ConnectionEvent::new(ConnectionId(7), TransportEvent::Opened))
            .unwrap();
        tx.send(ConnectionEvent::new(id, TransportEvent::Opened))
            .unwrap();

        let update = manager.next_update().await;
        assert_eq!(update, Some(SessionUpdate::Connected { slot: SlotId(0) }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_update_reports_idle_stream() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_inactivity_timeout(Duration::from_secs(5));
        let mut manager = manager_with(config, connector);
        open_all(&mut manager);
        manager.broadcast_query(&Query::new("hello", "en"));

        // paused clock auto-advances to the deadline
        let update = manager.next_update().await;

        assert_eq!(update, Some(SessionUpdate::StreamIdle { slot: SlotId(0) }));
        assert_eq!(manager.sessions()[0].state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_push_back_the_deadline() {
        let connector = Arc::new(MockConnector::default());
        let config = SessionConfig::default().with_inactivity_timeout(Duration::from_secs(5));
        let mut manager = manager_with(config, connector);
        open_all(&mut manager);
        manager.broadcast_query(&Query::new("hello", "en"));
        let started = Instant::now();

        tokio::time::advance(Duration::from_secs(4)).await;
        let event = frame(&manager, 0, token_frame("tick"));
        manager.handle_event(event);

        let update = manager.next_update().await;
        assert_eq!(update, Some(SessionUpdate::StreamIdle { slot: SlotId(0) }));
        assert!(Instant::now() >= started + Duration::from_secs(9));
    }
}
