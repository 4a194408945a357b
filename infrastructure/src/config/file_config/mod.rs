//! Raw TOML configuration data types
//!
//! These structs mirror the config file exactly. Every section uses
//! `#[serde(default)]`, so a partial file is always valid input.

mod capabilities;
mod logging;
mod repl;
mod server;
mod sessions;

pub use capabilities::FileCapabilitiesConfig;
pub use logging::FileLoggingConfig;
pub use repl::FileReplConfig;
pub use server::FileServerConfig;
pub use sessions::FileSessionsConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for timeouts, one day.
pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("server.api_url cannot be empty")]
    EmptyApiUrl,

    #[error("sessions.max must be at least 1")]
    ZeroMaxSessions,

    #[error("sessions.initial ({initial}) cannot exceed sessions.max ({max})")]
    InitialExceedsMax { initial: usize, max: usize },

    #[error("sessions.inactivity_timeout_seconds must be between 1 and 86400")]
    InvalidTimeout,

    #[error("server.open_timeout_seconds must be between 1 and 86400")]
    InvalidOpenTimeout,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend endpoint
    pub server: FileServerConfig,
    /// Session bounds and per-session defaults
    pub sessions: FileSessionsConfig,
    /// External clipboard and speech commands
    pub capabilities: FileCapabilitiesConfig,
    /// Conversation transcript and diagnostic log locations
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.api_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyApiUrl);
        }
        if !(1..=MAX_TIMEOUT_SECONDS).contains(&self.server.open_timeout_seconds) {
            return Err(ConfigValidationError::InvalidOpenTimeout);
        }
        if self.sessions.max == 0 {
            return Err(ConfigValidationError::ZeroMaxSessions);
        }
        if self.sessions.initial > self.sessions.max {
            return Err(ConfigValidationError::InitialExceedsMax {
                initial: self.sessions.initial,
                max: self.sessions.max,
            });
        }
        if !(1..=MAX_TIMEOUT_SECONDS).contains(&self.sessions.inactivity_timeout_seconds) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
api_url = "https://chat.example.com/api"
open_timeout_seconds = 5

[sessions]
max = 6
initial = 2
inactivity_timeout_seconds = 30
greeting = "Bonjour !"
language = "fr"
default_model = "granite-3b"

[capabilities]
clipboard_command = "wl-copy"
speech_command = "espeak-ng -v {lang}"

[logging]
conversation_log = "/tmp/chat.jsonl"

[repl]
show_progress = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.server.api_url, "https://chat.example.com/api");
        assert_eq!(config.server.open_timeout_seconds, 5);
        assert_eq!(config.sessions.max, 6);
        assert_eq!(config.sessions.initial, 2);
        assert_eq!(config.sessions.language, "fr");
        assert_eq!(
            config.capabilities.clipboard_command.as_deref(),
            Some("wl-copy")
        );
        assert_eq!(
            config.logging.conversation_log.as_deref(),
            Some("/tmp/chat.jsonl")
        );
        assert!(!config.repl.show_progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[sessions]\nmax = 2\n").unwrap();

        assert_eq!(config.sessions.max, 2);
        assert_eq!(config.sessions.initial, 1);
        assert_eq!(config.server, FileServerConfig::default());
        assert!(config.capabilities.speech_command.is_none());
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(FileConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FileConfig::default();
        config.sessions.max = 0;
        config.sessions.initial = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroMaxSessions));

        let mut config = FileConfig::default();
        config.sessions.max = 2;
        config.sessions.initial = 3;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InitialExceedsMax { initial: 3, max: 2 })
        );

        let mut config = FileConfig::default();
        config.sessions.inactivity_timeout_seconds = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));

        let mut config = FileConfig::default();
        config.sessions.inactivity_timeout_seconds = u64::MAX;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));

        let mut config = FileConfig::default();
        config.server.open_timeout_seconds = MAX_TIMEOUT_SECONDS + 1;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidOpenTimeout));

        let mut config = FileConfig::default();
        config.server.api_url = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyApiUrl));
    }

    #[test]
    fn test_to_session_config() {
        let mut config = FileConfig::default();
        config.sessions.max = 3;
        config.sessions.inactivity_timeout_seconds = 45;
        config.sessions.default_model = " granite ".to_string();

        let session = config.sessions.to_session_config();

        assert_eq!(session.max_sessions, 3);
        assert_eq!(session.inactivity_timeout, Duration::from_secs(45));
        assert_eq!(session.default_model.as_str(), "granite");
    }
}
