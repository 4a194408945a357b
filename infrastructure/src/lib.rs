//! Infrastructure layer for multichat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod capabilities;
pub mod catalog;
pub mod config;
pub mod files;
pub mod logging;
pub mod websocket;

// Re-export commonly used types
pub use capabilities::{CommandClipboard, CommandSpeech};
pub use catalog::HttpModelCatalog;
pub use config::{
    ConfigLoader, ConfigValidationError, FileCapabilitiesConfig, FileConfig, FileLoggingConfig,
    FileReplConfig, FileServerConfig, FileSessionsConfig,
};
pub use files::LocalFileReader;
pub use logging::JsonlConversationLogger;
pub use websocket::{WebSocketConnection, WebSocketConnector, WsEndpoint, WsError};
