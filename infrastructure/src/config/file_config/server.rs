//! Backend server configuration (`[server]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// HTTP API base; the WebSocket base is derived from it
    pub api_url: String,
    /// Seconds allowed for a WebSocket handshake
    pub open_timeout_seconds: u64,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            open_timeout_seconds: 10,
        }
    }
}
