use thiserror::Error;

use crate::inference::InferenceError;
use crate::preprocess::PreprocessError;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// The model behind a scorer is absent. Never degrade this to a verdict.
    #[error("scorer unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    #[error("image could not be decoded: {0}")]
    Decode(PreprocessError),

    #[error("scoring failed: {reason}")]
    ScoringFailure { reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl From<InferenceError> for ScoringError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelNotFound { .. }
            | InferenceError::ModelLoadFailed { .. }
            | InferenceError::DeviceUnavailable { .. } => ScoringError::ServiceUnavailable {
                reason: err.to_string(),
            },
            _ => ScoringError::ScoringFailure {
                reason: err.to_string(),
            },
        }
    }
}

impl From<PreprocessError> for ScoringError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::InvalidConfig { .. } | PreprocessError::Tensor { .. } => {
                ScoringError::ScoringFailure {
                    reason: err.to_string(),
                }
            }
            _ => ScoringError::Decode(err),
        }
    }
}
