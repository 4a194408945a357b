//! Prepare attachment use case
//!
//! Turns a user file selection into an [`Attachment`] ready to ride along
//! with a query:
//!
//! 1. **Reject** selections of more than one path without touching the disk
//! 2. **Stat** the file through the [`FileReader`] port and check its size
//!    before any content is read
//! 3. **Read and encode** the accepted file as a base64 data URI, checking the
//!    size again since the file may have grown in between

use crate::ports::capabilities::FileReader;
use multichat_domain::{
    Attachment, AttachmentError, FileMetadata, encode_attachment, validate_files,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct PrepareAttachmentUseCase {
    reader: Arc<dyn FileReader>,
}

impl PrepareAttachmentUseCase {
    pub fn new(reader: Arc<dyn FileReader>) -> Self {
        Self { reader }
    }

    pub async fn execute(&self, paths: &[PathBuf]) -> Result<Attachment, AttachmentError> {
        let path = match paths {
            [] => return Err(AttachmentError::NoFile),
            [path] => path,
            many => return Err(AttachmentError::TooManyFiles { count: many.len() }),
        };

        let metadata = self
            .reader
            .metadata(path)
            .await
            .map_err(|source| AttachmentError::ReadError {
                file_name: display_name(path),
                source,
            })?;
        let accepted = validate_files(std::slice::from_ref(&metadata))?;
        let file_name = accepted.file_name.clone();
        debug!(file = %file_name, size = accepted.size_bytes, "Attachment accepted");

        let bytes = self
            .reader
            .read(path)
            .await
            .map_err(|source| AttachmentError::ReadError {
                file_name: file_name.clone(),
                source,
            })?;
        validate_files(&[FileMetadata::new(file_name.clone(), bytes.len() as u64)])?;

        let mime_type = self.reader.mime_type(path);
        let attachment = encode_attachment(&file_name, &bytes, mime_type.as_deref());

        info!(
            file = %attachment.file_name(),
            mime = %attachment.mime_type(),
            size = attachment.size_bytes(),
            "Attachment prepared"
        );
        Ok(attachment)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
