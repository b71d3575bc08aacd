use thiserror::Error;

/// Failure turning raw upload bytes into a [`NormalizedImage`](super::NormalizedImage).
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("image payload is empty")]
    EmptyInput,

    #[error("unrecognised image format")]
    UnknownFormat,

    #[error("failed to decode image: {reason}")]
    Decode { reason: String },

    #[error("image has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid preprocessing configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to build image tensor: {reason}")]
    Tensor { reason: String },
}

impl From<image::ImageError> for PreprocessError {
    fn from(err: image::ImageError) -> Self {
        PreprocessError::Decode {
            reason: err.to_string(),
        }
    }
}

impl From<candle_core::Error> for PreprocessError {
    fn from(err: candle_core::Error) -> Self {
        PreprocessError::Tensor {
            reason: err.to_string(),
        }
    }
}
