use thiserror::Error;

/// Boundary rejections. All of them happen before any decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("no file part in the request")]
    MissingFile,

    #[error("no selected file")]
    EmptyFilename,

    #[error("unsupported file type: {extension}")]
    UnsupportedMediaType { extension: String },

    #[error("file must be an image")]
    NotAnImage { content_type: String },

    #[error("file too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
}
