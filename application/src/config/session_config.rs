//! Session parameters consumed by the chat engine.
//!
//! [`SessionConfig`] is built by the binary from the file/CLI configuration
//! and handed to [`SessionManager`](crate::session::manager::SessionManager).

use multichat_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session manager and per-session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound on concurrently open sessions.
    pub max_sessions: usize,
    /// Sessions opened at startup (clamped to `1..=max_sessions`).
    pub initial_sessions: usize,
    /// A streaming answer with no token for this long is considered finished.
    pub inactivity_timeout: Duration,
    /// Text of the Answer that seeds every history.
    pub greeting: String,
    /// Language code placed in outgoing envelopes.
    pub language: String,
    /// Model for new sessions until a catalog is loaded.
    pub default_model: Model,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 4,
            initial_sessions: 1,
            inactivity_timeout: Duration::from_secs(120),
            greeting: "Hello! How can I help you today?".to_string(),
            language: "en".to_string(),
            default_model: Model::default(),
        }
    }
}

impl SessionConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_initial_sessions(mut self, initial: usize) -> Self {
        self.initial_sessions = initial;
        self
    }

    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_default_model(mut self, model: Model) -> Self {
        self.default_model = model;
        self
    }

    /// Number of sessions to open at startup, within the manager's bounds.
    pub fn startup_sessions(&self) -> usize {
        self.initial_sessions.clamp(1, self.max_sessions.max(1))
    }
}
