//! Streaming endpoint derived from the HTTP API base.
//!
//! `http://host/api` → `ws://host/ws`, `https://host/api` → `wss://host/ws`.
//! Each session connects to `<ws-base>/query/<connection-id>`.

use super::error::WsError;
use multichat_application::ConnectionId;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsEndpoint {
    base: String,
}

impl WsEndpoint {
    pub fn from_api_url(api_url: &str) -> Result<Self, WsError> {
        let invalid = |reason: &str| WsError::InvalidEndpoint {
            url: api_url.to_string(),
            reason: reason.to_string(),
        };

        let mut url = Url::parse(api_url.trim()).map_err(|e| invalid(&e.to_string()))?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            _ => return Err(invalid("expected an http(s) or ws(s) URL")),
        };
        url.set_scheme(scheme)
            .map_err(|_| invalid("cannot switch to a WebSocket scheme"))?;

        let path = url.path().trim_end_matches('/').to_string();
        if let Some(prefix) = path.strip_suffix("/api") {
            url.set_path(&format!("{}/ws", prefix));
        } else {
            url.set_path(&path);
        }

        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// URL of one session's streaming connection.
    pub fn query_url(&self, id: ConnectionId) -> String {
        format!("{}/query/{}", self.base, id)
    }
}
