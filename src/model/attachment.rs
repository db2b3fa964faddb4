//! Files uploaded with new or edited cases.

use std::path::Path;

use crate::error::FbError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A binary payload plus the metadata needed to upload it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment with a generic content type.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            bytes,
        }
    }

    /// Reads a file from disk, naming the attachment after the file.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Io` if the file cannot be read, or
    /// `FbError::Validation` if the path has no file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FbError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FbError::validation(format!("{} has no file name", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(filename, bytes))
    }

    /// Sets the MIME type sent with the upload.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Upload file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// MIME type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
