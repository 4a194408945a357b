//! Session configuration from TOML (`[sessions]` section)

use multichat_application::SessionConfig;
use multichat_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionsConfig {
    /// Maximum concurrent sessions
    pub max: usize,
    /// Sessions opened at startup
    pub initial: usize,
    /// Seconds without a token before a stream is considered finished
    pub inactivity_timeout_seconds: u64,
    /// Opening answer of every conversation
    pub greeting: String,
    /// Language code sent with every query
    pub language: String,
    /// Model used until the catalog is loaded (empty = first catalog entry)
    pub default_model: String,
}

impl Default for FileSessionsConfig {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            max: defaults.max_sessions,
            initial: defaults.initial_sessions,
            inactivity_timeout_seconds: defaults.inactivity_timeout.as_secs(),
            greeting: defaults.greeting,
            language: defaults.language,
            default_model: String::new(),
        }
    }
}

impl FileSessionsConfig {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_max_sessions(self.max)
            .with_initial_sessions(self.initial)
            .with_inactivity_timeout(Duration::from_secs(self.inactivity_timeout_seconds))
            .with_greeting(self.greeting.clone())
            .with_language(self.language.clone())
            .with_default_model(Model::new(self.default_model.trim()))
    }
}
