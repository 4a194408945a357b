//! Per-answer actions: copy to clipboard and read aloud.

use crate::ports::capabilities::{CapabilityError, ClipboardWriter, TextToSpeech};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum MessageActionError {
    #[error("{0} is not supported on this system")]
    Unsupported(&'static str),

    #[error("Nothing to act on: the answer is empty")]
    EmptyMessage,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Copy and speak actions offered next to every answer
pub struct MessageActions {
    clipboard: Arc<dyn ClipboardWriter>,
    speech: Arc<dyn TextToSpeech>,
}

impl MessageActions {
    pub fn new(clipboard: Arc<dyn ClipboardWriter>, speech: Arc<dyn TextToSpeech>) -> Self {
        Self { clipboard, speech }
    }

    pub fn can_copy(&self) -> bool {
        self.clipboard.is_available()
    }

    pub fn can_speak(&self) -> bool {
        self.speech.is_available()
    }

    pub async fn copy(&self, text: &str) -> Result<(), MessageActionError> {
        if text.is_empty() {
            return Err(MessageActionError::EmptyMessage);
        }
        if !self.clipboard.is_available() {
            return Err(MessageActionError::Unsupported("Clipboard"));
        }
        self.clipboard.write_text(text).await.inspect_err(|e| {
            warn!("Failed to copy content: {}", e);
        })?;
        debug!(chars = text.chars().count(), "Content copied to clipboard");
        Ok(())
    }

    /// Read `text` aloud in `language` (a language code such as `en-US`).
    pub async fn speak(&self, text: &str, language: &str) -> Result<(), MessageActionError> {
        if text.is_empty() {
            return Err(MessageActionError::EmptyMessage);
        }
        if !self.speech.is_available() {
            return Err(MessageActionError::Unsupported("Speech synthesis"));
        }
        self.speech.speak(text, language).await?;
        Ok(())
    }
}
