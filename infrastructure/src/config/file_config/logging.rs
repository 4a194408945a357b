//! Logging configuration (`[logging]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of queries, backend errors and connection events
    pub conversation_log: Option<String>,
    /// Directory for daily-rotated diagnostic logs
    pub log_dir: Option<String>,
}
