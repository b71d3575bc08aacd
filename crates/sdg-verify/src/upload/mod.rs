//! Cheap, deterministic checks on an upload before it reaches a model.

pub mod error;


pub use error::UploadRejection;

use crate::constants::{ALLOWED_EXTENSIONS, LARGE_MAX_UPLOAD_BYTES, STANDARD_MAX_UPLOAD_BYTES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl UploadPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// 5 MiB cap.
    pub fn standard() -> Self {
        Self::new(STANDARD_MAX_UPLOAD_BYTES)
    }

    /// 100 MB cap.
    pub fn large() -> Self {
        Self::new(LARGE_MAX_UPLOAD_BYTES)
    }

    /// Requires a non-empty name whose final `.ext` is allow-listed.
    pub fn check_filename(&self, filename: Option<&str>) -> Result<(), UploadRejection> {
        let filename = filename.map(str::trim).unwrap_or_default();
        if filename.is_empty() {
            return Err(UploadRejection::EmptyFilename);
        }

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension.is_empty() || !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(UploadRejection::UnsupportedMediaType { extension });
        }
        Ok(())
    }

    /// Requires a declared `image/*` content type.
    pub fn check_content_type(&self, content_type: Option<&str>) -> Result<(), UploadRejection> {
        let content_type = content_type.map(str::trim).unwrap_or_default();
        if content_type.to_ascii_lowercase().starts_with("image/") {
            return Ok(());
        }
        Err(UploadRejection::NotAnImage {
            content_type: content_type.to_string(),
        })
    }

    pub fn check_size(&self, size: usize) -> Result<(), UploadRejection> {
        if size > self.max_bytes {
            return Err(UploadRejection::PayloadTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Runs every check in the order the boundary applies them.
    pub fn check(
        &self,
        filename: Option<&str>,
        content_type: Option<&str>,
        size: usize,
    ) -> Result<(), UploadRejection> {
        self.check_filename(filename)?;
        self.check_content_type(content_type)?;
        self.check_size(size)
    }
}
