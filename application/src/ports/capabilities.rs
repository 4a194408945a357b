//! Host capability ports
//!
//! File reading, clipboard and speech are provided by the host environment.
//! The application layer only knows these traits; adapters live in the
//! infrastructure layer.

use async_trait::async_trait;
use multichat_domain::FileMetadata;
use std::path::Path;
use thiserror::Error;

/// Errors raised by capability adapters
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Capability not available: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },
}

/// Reads user-selected files
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Name and size of the file, without reading its content.
    async fn metadata(&self, path: &Path) -> std::io::Result<FileMetadata>;

    /// Full file content.
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Media type guessed for the file, if any.
    fn mime_type(&self, path: &Path) -> Option<String>;
}

/// Writes text to the system clipboard
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    fn is_available(&self) -> bool;

    async fn write_text(&self, text: &str) -> Result<(), CapabilityError>;
}

/// Reads text aloud
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    fn is_available(&self) -> bool;

    async fn speak(&self, text: &str, language: &str) -> Result<(), CapabilityError>;
}
