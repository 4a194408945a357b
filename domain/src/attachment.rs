//! Attachments: size/arity validation and data-URI encoding.
//!
//! Validation runs on file metadata only, so an oversized file is rejected
//! before any of its bytes are read.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted attachment, in bytes (25 MB).
pub const MAX_ATTACHMENT_BYTES: u64 = 25_000_000;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Attachment validation and loading errors
#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("No file selected.")]
    NoFile,

    #[error("Uploaded more than one file ({count}).")]
    TooManyFiles { count: usize },

    #[error("File {file_name} is larger than 25MB ({size_bytes} bytes).")]
    FileTooLarge { file_name: String, size_bytes: u64 },

    #[error("Failed to read file {file_name}: {source}")]
    ReadError {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

/// What is known about a file before reading it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub size_bytes: u64,
}

impl FileMetadata {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
        }
    }
}

/// An encoded file ready to travel inside an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    mime_type: String,
    size_bytes: u64,
    encoded_payload: String,
}

impl Attachment {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// `data:<mime>;base64,<payload>`
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }
}

/// Check a file selection: exactly one file, at most [`MAX_ATTACHMENT_BYTES`].
pub fn validate_files(files: &[FileMetadata]) -> Result<&FileMetadata, AttachmentError> {
    match files {
        [] => Err(AttachmentError::NoFile),
        [file] if file.size_bytes > MAX_ATTACHMENT_BYTES => Err(AttachmentError::FileTooLarge {
            file_name: file.file_name.clone(),
            size_bytes: file.size_bytes,
        }),
        [file] => Ok(file),
        many => Err(AttachmentError::TooManyFiles { count: many.len() }),
    }
}

/// Encode file content as a base64 data URI.
pub fn encode_attachment(file_name: &str, bytes: &[u8], mime_type: Option<&str>) -> Attachment {
    let mime_type = mime_type
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MIME)
        .to_string();
    let encoded_payload = format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes));
    Attachment {
        file_name: file_name.to_string(),
        mime_type,
        size_bytes: bytes.len() as u64,
        encoded_payload,
    }
}
