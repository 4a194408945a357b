//! [`FileReader`] over `tokio::fs`, guessing media types with `mime_guess`.

use async_trait::async_trait;
use multichat_application::FileReader;
use multichat_domain::FileMetadata;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileReader;

impl LocalFileReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileReader for LocalFileReader {
    async fn metadata(&self, path: &Path) -> std::io::Result<FileMetadata> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(FileMetadata::new(file_name, metadata.len()))
    }

    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    fn mime_type(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }
}
